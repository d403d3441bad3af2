use note_tracks::{
    select_index, select_track_with, Note, SelectionParams, TimeSignature, Track, TrackSelection,
};
use sheetconf::{SectionsConfig, SelectionConfig};

use crate::chords::{extract_chords, ChordParams};
use crate::key::detect_key;
use crate::sections::{segment_sections, with_local_keys};
use crate::types::{ChordEvent, KeyEstimate, Section};

/// Trait for song analysis backends.
///
/// `HeuristicAnalyzer` is the only production backend; tests swap in
/// wrappers to inject delays or fixed answers.
pub trait SongAnalyzer: Send + Sync {
    fn select_track<'a>(
        &self,
        tracks: &'a [Track],
        track_override: Option<usize>,
        params: &SelectionParams,
    ) -> note_tracks::Result<TrackSelection<'a>>;

    /// Key over the notes of every track.
    fn analyze_key(&self, tracks: &[Track]) -> KeyEstimate;

    fn extract_chords(
        &self,
        track: &Track,
        time_signature: &TimeSignature,
        params: &ChordParams,
    ) -> Vec<ChordEvent>;

    fn segment_sections(
        &self,
        chords: &[ChordEvent],
        notes: &[Note],
        time_signature: &TimeSignature,
        config: &SectionsConfig,
    ) -> Vec<Section>;
}

/// Heuristic analyzer: register-weighted track choice, Krumhansl-Schmuckler
/// key detection, template-matching chord extraction and positional sections.
pub struct HeuristicAnalyzer;

impl SongAnalyzer for HeuristicAnalyzer {
    fn select_track<'a>(
        &self,
        tracks: &'a [Track],
        track_override: Option<usize>,
        params: &SelectionParams,
    ) -> note_tracks::Result<TrackSelection<'a>> {
        match track_override {
            Some(index) => select_index(tracks, index, params),
            None => select_track_with(tracks, params),
        }
    }

    fn analyze_key(&self, tracks: &[Track]) -> KeyEstimate {
        detect_key(tracks.iter().flat_map(|t| t.notes.iter()))
    }

    fn extract_chords(
        &self,
        track: &Track,
        time_signature: &TimeSignature,
        params: &ChordParams,
    ) -> Vec<ChordEvent> {
        extract_chords(track, time_signature, params)
    }

    fn segment_sections(
        &self,
        chords: &[ChordEvent],
        notes: &[Note],
        time_signature: &TimeSignature,
        config: &SectionsConfig,
    ) -> Vec<Section> {
        let sections = segment_sections(chords, time_signature, config);
        with_local_keys(sections, notes, time_signature, config.min_local_key_notes)
    }
}

/// Selection weights from configuration.
pub fn selection_params(config: &SelectionConfig) -> SelectionParams {
    SelectionParams {
        chord_range: (config.chord_range_low, config.chord_range_high),
        chord_range_weight: config.chord_range_weight,
        bass_weight: config.bass_weight,
    }
}
