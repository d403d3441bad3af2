use std::collections::BTreeMap;

use note_tracks::{Note, TimeSignature, Track};

use crate::chord_templates::{identify_chord_with, ChordTemplate, TEMPLATES};
use crate::types::ChordEvent;

/// How notes are grouped and labeled.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordParams {
    /// Onsets rounding to the same multiple of this (in beats) are simultaneous
    pub window_beats: f64,
    /// Duration of the last chord event, in beats
    pub final_chord_beats: f64,
}

impl ChordParams {
    /// Convert a window in milliseconds to beats at the given tempo.
    pub fn window_ms_to_beats(window_ms: f64, tempo_bpm: f64) -> f64 {
        window_ms / 1000.0 * tempo_bpm / 60.0
    }
}

impl Default for ChordParams {
    fn default() -> Self {
        Self {
            // 100 ms at 120 BPM
            window_beats: 0.2,
            final_chord_beats: 4.0,
        }
    }
}

/// Notes sharing a quantized onset.
#[derive(Debug, Clone, PartialEq)]
pub struct Simultaneity {
    /// Quantized onset, in beats
    pub time: f64,
    pub notes: Vec<Note>,
}

/// Group notes whose onsets quantize to the same window, in time order.
pub fn group_simultaneities(notes: &[Note], window_beats: f64) -> Vec<Simultaneity> {
    if window_beats <= 0.0 || !window_beats.is_finite() {
        return Vec::new();
    }

    let mut groups: BTreeMap<i64, Vec<Note>> = BTreeMap::new();
    for note in notes.iter().filter(|n| n.onset.is_finite()) {
        let slot = (note.onset / window_beats).round() as i64;
        groups.entry(slot).or_default().push(*note);
    }

    groups
        .into_iter()
        .map(|(slot, notes)| Simultaneity {
            time: slot as f64 * window_beats,
            notes,
        })
        .collect()
}

/// Extract chord events from a track using the built-in patterns.
pub fn extract_chords(
    track: &Track,
    time_signature: &TimeSignature,
    params: &ChordParams,
) -> Vec<ChordEvent> {
    extract_chords_with(track, time_signature, params, TEMPLATES)
}

/// Extract chord events from a track.
///
/// Notes are grouped into simultaneities; each group of two or more notes
/// with at least two distinct pitch classes becomes one chord. A lone note
/// never becomes a chord. Each chord lasts until the next simultaneity
/// (chord or not), the last one for `final_chord_beats`. Consecutive
/// restatements of the same chord in the same bar are dropped.
pub fn extract_chords_with(
    track: &Track,
    time_signature: &TimeSignature,
    params: &ChordParams,
    templates: &[ChordTemplate],
) -> Vec<ChordEvent> {
    let groups = group_simultaneities(&track.notes, params.window_beats);
    let mut chords = Vec::new();

    for (i, group) in groups.iter().enumerate() {
        if group.notes.len() < 2 {
            continue;
        }

        let pitch_classes: Vec<u8> = group.notes.iter().map(Note::pitch_class).collect();
        let Some(matched) = identify_chord_with(&pitch_classes, templates) else {
            continue;
        };

        let duration = match groups.get(i + 1) {
            Some(next) => next.time - group.time,
            None => params.final_chord_beats,
        };

        chords.push(ChordEvent {
            symbol: matched.symbol,
            root_pitch_class: matched.root_pitch_class,
            root: matched.root.to_string(),
            quality: matched.quality,
            start: group.time,
            duration,
            bar: time_signature.bar_of(group.time),
            score: matched.score,
        });
    }

    dedup_chords(chords)
}

/// Drop chords that repeat the previous kept chord's symbol within the same bar.
pub fn dedup_chords(chords: Vec<ChordEvent>) -> Vec<ChordEvent> {
    let mut unique: Vec<ChordEvent> = Vec::with_capacity(chords.len());
    for chord in chords {
        let repeat = unique
            .last()
            .is_some_and(|last| last.symbol == chord.symbol && last.bar == chord.bar);
        if !repeat {
            unique.push(chord);
        }
    }
    unique
}
