pub mod analyzer;
pub mod batch;
pub mod chord_templates;
pub mod chords;
pub mod difficulty;
pub mod key;
pub mod quality;
pub mod sections;
pub mod types;

pub use analyzer::{selection_params, HeuristicAnalyzer, SongAnalyzer};
pub use batch::{convert_batch, summarize, BatchEntry, BatchOutcome, BatchSummary};
pub use chords::ChordParams;
pub use difficulty::{rate_difficulty, DifficultyScore};
pub use types::{
    ChordEvent, ChordFamily, ChordQuality, Difficulty, KeyEstimate, KeyMode, Measure,
    QualityStatus, RejectionReason, Section, Song, SongInput, NO_CHORD,
};

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use note_tracks::TimeSignature;
use sheetconf::SheetConfig;
use tracing::{debug, info};

/// Errors that abort the conversion of one song.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Track(#[from] note_tracks::Error),

    #[error(transparent)]
    Config(#[from] sheetconf::ConfigError),

    /// A chord starts at or past `sections.max_song_bars`.
    #[error("song reaches bar {last_bar}, past the limit of {limit} bars")]
    SongTooLong { last_bar: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Song conversion engine.
///
/// Runs track selection, key detection, chord extraction, sectioning and
/// the quality gate over one decoded song. Holds only read-only state, so
/// one converter is shared across every song of a batch.
pub struct SongConverter {
    analyzer: Arc<dyn SongAnalyzer>,
    config: Arc<SheetConfig>,
}

impl SongConverter {
    /// Create with the default heuristic analyzer.
    pub fn new(config: SheetConfig) -> Result<Self> {
        Self::with_analyzer(Arc::new(HeuristicAnalyzer), config)
    }

    /// Create with a custom analyzer (for testing or another backend).
    pub fn with_analyzer(analyzer: Arc<dyn SongAnalyzer>, config: SheetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            analyzer,
            config: Arc::new(config),
        })
    }

    /// Load configuration from the standard locations (or `path`) and build a converter.
    pub fn from_config_file(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = SheetConfig::load_from(path).with_context(|| match path {
            Some(p) => format!("loading converter config from {}", p.display()),
            None => "loading converter config".to_string(),
        })?;
        Self::new(config).context("building song converter")
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Per-song correction, then the header, then the configured default.
    pub fn resolve_time_signature(&self, input: &SongInput) -> TimeSignature {
        if let Some(fixed) = self.config.overrides.time_signatures.get(&input.identifier) {
            info!(
                identifier = %input.identifier,
                time_signature = %format!("{}/{}", fixed.numerator, fixed.denominator),
                "time signature override applied"
            );
            return TimeSignature::new(fixed.numerator, fixed.denominator);
        }

        input.time_signature.unwrap_or_else(|| {
            TimeSignature::new(self.config.defaults.numerator, self.config.defaults.denominator)
        })
    }

    /// Header tempo rounded to whole BPM, or the configured default.
    pub fn resolve_tempo(&self, input: &SongInput) -> u32 {
        match input.tempo_bpm {
            Some(bpm) if bpm.is_finite() && bpm > 0.0 => (bpm.round() as u32).max(1),
            _ => self.config.defaults.tempo_bpm,
        }
    }

    /// Convert one song.
    ///
    /// Returns `Err` only for structural problems such as a song without a
    /// usable track. A rejected song is a successful result whose
    /// `quality` carries the reasons.
    pub fn convert(&self, input: &SongInput) -> Result<Song> {
        let config = &self.config;

        // 1. Track selection (one track)
        let selection = self.analyzer.select_track(
            &input.tracks,
            input.track_override,
            &selection_params(&config.selection),
        )?;
        debug!(
            identifier = %input.identifier,
            track = selection.index,
            notes = selection.stats.note_count,
            score = selection.score,
            "selected harmony track"
        );

        // 2. Header values
        let time_signature = self.resolve_time_signature(input);
        let tempo_bpm = self.resolve_tempo(input);

        // 3. Key (all tracks)
        let key = self.analyzer.analyze_key(&input.tracks);
        info!(
            identifier = %input.identifier,
            tonic = %key.tonic_name,
            mode = %key.mode,
            confidence = key.confidence,
            neutral = key.neutral_default,
            "detected key"
        );

        // 4. Chords
        let params = ChordParams {
            window_beats: ChordParams::window_ms_to_beats(
                config.chords.simultaneity_window_ms,
                f64::from(tempo_bpm),
            ),
            final_chord_beats: config.chords.final_chord_beats,
        };
        let chords = self
            .analyzer
            .extract_chords(selection.track, &time_signature, &params);
        debug!(identifier = %input.identifier, chords = chords.len(), "extracted chords");

        let limit = config.sections.max_song_bars;
        if let Some(last_bar) = chords.iter().map(|c| c.bar).max().filter(|&b| b >= limit) {
            return Err(Error::SongTooLong { last_bar, limit });
        }

        // 5. Sections
        let sections = self.analyzer.segment_sections(
            &chords,
            &selection.track.notes,
            &time_signature,
            &config.sections,
        );

        // 6. Quality gate
        let quality =
            quality::evaluate(&input.identifier, &key, &chords, &time_signature, &config.quality);

        let difficulty = if quality.is_accepted() {
            Some(rate_difficulty(&chords, &sections, &config.difficulty).level)
        } else {
            info!(
                identifier = %input.identifier,
                reasons = ?quality.reasons(),
                "song rejected"
            );
            None
        };

        let song = Song {
            identifier: input.identifier.clone(),
            key,
            time_signature,
            tempo_bpm,
            sections,
            difficulty,
            quality,
        };
        info!(
            identifier = %song.identifier,
            time_signature = %song.time_signature,
            tempo_bpm = song.tempo_bpm,
            sections = song.sections.len(),
            bars = song.total_bars(),
            accepted = song.is_accepted(),
            "converted song"
        );
        Ok(song)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use note_tracks::{Note, Track};

    fn converter() -> SongConverter {
        SongConverter::new(SheetConfig::default()).unwrap()
    }

    fn one_note_song(identifier: &str) -> SongInput {
        SongInput::new(identifier, vec![Track::new(vec![Note::new(60, 0.0, 1.0)])])
    }

    #[test]
    fn time_signature_falls_back_to_common_time() {
        let sig = converter().resolve_time_signature(&one_note_song("x"));
        assert_eq!(sig, TimeSignature::new(4, 4));
        assert_eq!(sig.beats_per_bar, 4);
    }

    #[test]
    fn header_time_signature_used() {
        let input = one_note_song("x").with_time_signature(TimeSignature::new(3, 4));
        assert_eq!(converter().resolve_time_signature(&input).to_string(), "3/4");
    }

    #[test]
    fn override_beats_header() {
        let input = one_note_song("33_Dave_Brubeck-Take_Five")
            .with_time_signature(TimeSignature::new(4, 4));
        let sig = converter().resolve_time_signature(&input);
        assert_eq!(sig, TimeSignature::new(5, 4));
        assert_eq!(sig.beats_per_bar, 5);
    }

    #[test]
    fn tempo_rounds_and_falls_back() {
        let c = converter();
        assert_eq!(c.resolve_tempo(&one_note_song("x")), 120);
        assert_eq!(c.resolve_tempo(&one_note_song("x").with_tempo(97.6)), 98);
        assert_eq!(c.resolve_tempo(&one_note_song("x").with_tempo(0.0)), 120);
        assert_eq!(c.resolve_tempo(&one_note_song("x").with_tempo(f64::NAN)), 120);
        assert_eq!(c.resolve_tempo(&one_note_song("x").with_tempo(-80.0)), 120);
    }

    #[test]
    fn invalid_config_refused() {
        let mut config = SheetConfig::default();
        config.sections.max_bars = 0;
        assert!(matches!(SongConverter::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn no_usable_track_is_an_error() {
        let input = SongInput::new("empty", vec![Track::default(), Track::default()]);
        let err = converter().convert(&input).unwrap_err();
        assert!(matches!(err, Error::Track(note_tracks::Error::NoUsableTrack)));
    }

    #[test]
    fn melody_only_song_is_rejected_not_failed() {
        let melody = Track::new(
            [60, 62, 64, 65, 67, 69, 71, 72]
                .iter()
                .enumerate()
                .map(|(i, &p)| Note::new(p, i as f64, 1.0))
                .collect(),
        );
        let song = converter().convert(&SongInput::new("melody", vec![melody])).unwrap();
        assert!(!song.is_accepted());
        assert!(song.quality.has_reason(RejectionReason::InsufficientChordVariety));
        assert!(song.quality.has_reason(RejectionReason::InsufficientChordData));
        assert_eq!(song.difficulty, None);
        // no chords: a single empty placeholder section
        assert_eq!(song.sections.len(), 1);
        assert_eq!(song.sections[0].name, "Main");
        assert_eq!(song.total_bars(), 8);
    }

    fn song_with_late_chord(onset: f64) -> SongInput {
        let mut notes = vec![
            Note::new(60, 0.0, 1.0),
            Note::new(64, 0.0, 1.0),
            Note::new(67, 0.0, 1.0),
        ];
        notes.extend([65, 69, 72].map(|p| Note::new(p, onset, 1.0)));
        SongInput::new("late", vec![Track::new(notes)])
    }

    #[test]
    fn distant_onsets_are_refused() {
        for onset in [1e10, 1e20, f64::MAX] {
            let err = converter().convert(&song_with_late_chord(onset)).unwrap_err();
            match err {
                Error::SongTooLong { last_bar, limit } => {
                    assert_eq!(limit, 10_000);
                    assert!(last_bar >= limit, "bar {last_bar} for onset {onset}");
                }
                other => panic!("expected SongTooLong for onset {onset}, got {other:?}"),
            }
        }
    }

    #[test]
    fn song_bar_limit_comes_from_config() {
        let mut config = SheetConfig::default();
        config.sections.max_song_bars = 16;
        let converter = SongConverter::new(config).unwrap();

        // F lands in bar 15, the last one allowed
        let song = converter.convert(&song_with_late_chord(60.0)).unwrap();
        assert_eq!(song.total_bars(), 16);

        let err = converter.convert(&song_with_late_chord(64.0)).unwrap_err();
        assert!(matches!(err, Error::SongTooLong { last_bar: 16, limit: 16 }));
        assert_eq!(err.to_string(), "song reaches bar 16, past the limit of 16 bars");
    }
}
