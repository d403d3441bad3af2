//! Analysis configuration - the hand-tuned tables the pipeline reads.
//!
//! Each table is plain data with compiled defaults. The pipeline treats
//! these as read-only once loaded, so one `SheetConfig` can be shared
//! across every concurrent song conversion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Track selection weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Lowest mean pitch of the chordal register (inclusive).
    /// Default: 48
    #[serde(default = "SelectionConfig::default_chord_range_low")]
    pub chord_range_low: f64,

    /// Highest mean pitch of the chordal register (inclusive).
    /// Default: 72
    #[serde(default = "SelectionConfig::default_chord_range_high")]
    pub chord_range_high: f64,

    /// Score multiplier for tracks sitting in the chordal register.
    /// Default: 2.0
    #[serde(default = "SelectionConfig::default_chord_range_weight")]
    pub chord_range_weight: f64,

    /// Score multiplier for tracks below the chordal register.
    /// Default: 1.5
    #[serde(default = "SelectionConfig::default_bass_weight")]
    pub bass_weight: f64,
}

impl SelectionConfig {
    fn default_chord_range_low() -> f64 {
        48.0
    }

    fn default_chord_range_high() -> f64 {
        72.0
    }

    fn default_chord_range_weight() -> f64 {
        2.0
    }

    fn default_bass_weight() -> f64 {
        1.5
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            chord_range_low: Self::default_chord_range_low(),
            chord_range_high: Self::default_chord_range_high(),
            chord_range_weight: Self::default_chord_range_weight(),
            bass_weight: Self::default_bass_weight(),
        }
    }
}

/// Chord extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordsConfig {
    /// Onsets closer than this are one simultaneity.
    /// Default: 100 ms
    #[serde(default = "ChordsConfig::default_simultaneity_window_ms")]
    pub simultaneity_window_ms: f64,

    /// Duration given to the last chord event, in beats.
    /// Default: 4.0
    #[serde(default = "ChordsConfig::default_final_chord_beats")]
    pub final_chord_beats: f64,
}

impl ChordsConfig {
    fn default_simultaneity_window_ms() -> f64 {
        100.0
    }

    fn default_final_chord_beats() -> f64 {
        4.0
    }
}

impl Default for ChordsConfig {
    fn default() -> Self {
        Self {
            simultaneity_window_ms: Self::default_simultaneity_window_ms(),
            final_chord_beats: Self::default_final_chord_beats(),
        }
    }
}

/// Section segmentation and naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionsConfig {
    /// Longest section, in bars.
    /// Default: 32
    #[serde(default = "SectionsConfig::default_max_bars")]
    pub max_bars: usize,

    /// Sections at or under this length may be named Intro/Outro.
    /// Default: 8
    #[serde(default = "SectionsConfig::default_short_section_bars")]
    pub short_section_bars: usize,

    /// Length of the placeholder section emitted for chordless songs.
    /// Capped at `max_bars`.
    /// Default: 8
    #[serde(default = "SectionsConfig::default_empty_song_bars")]
    pub empty_song_bars: usize,

    /// Names handed out to sections after the first, in order.
    #[serde(default = "SectionsConfig::default_rotation")]
    pub rotation: Vec<String>,

    /// Notes needed inside a section before a local key is estimated.
    /// Default: 8
    #[serde(default = "SectionsConfig::default_min_local_key_notes")]
    pub min_local_key_notes: usize,

    /// Songs whose last chord lands past this many bars are refused.
    /// Default: 10000
    #[serde(default = "SectionsConfig::default_max_song_bars")]
    pub max_song_bars: usize,
}

impl SectionsConfig {
    fn default_max_bars() -> usize {
        32
    }

    fn default_short_section_bars() -> usize {
        8
    }

    fn default_empty_song_bars() -> usize {
        8
    }

    fn default_rotation() -> Vec<String> {
        ["Verse", "Chorus", "Verse", "Chorus", "Bridge", "Verse", "Chorus"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn default_min_local_key_notes() -> usize {
        8
    }

    fn default_max_song_bars() -> usize {
        10_000
    }
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            max_bars: Self::default_max_bars(),
            short_section_bars: Self::default_short_section_bars(),
            empty_song_bars: Self::default_empty_song_bars(),
            rotation: Self::default_rotation(),
            min_local_key_notes: Self::default_min_local_key_notes(),
            max_song_bars: Self::default_max_song_bars(),
        }
    }
}

/// A time signature + tonic pairing known to come from broken sources.
///
/// Matching ignores mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousCombination {
    pub numerator: u8,
    pub denominator: u8,
    /// Pitch class 0–11 of the detected tonic.
    pub tonic: u8,
}

/// Quality gate thresholds and exception lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Default: 0.70
    #[serde(default = "QualityConfig::default_min_key_confidence")]
    pub min_key_confidence: f64,

    /// Distinct chord symbols required, excluding "no chord".
    /// Default: 3
    #[serde(default = "QualityConfig::default_min_distinct_chords")]
    pub min_distinct_chords: usize,

    /// Chord events required after deduplication. Catches melody-only input.
    /// Default: 4
    #[serde(default = "QualityConfig::default_min_chord_events")]
    pub min_chord_events: usize,

    /// Song identifiers rejected outright.
    #[serde(default = "QualityConfig::default_excluded_sources")]
    pub excluded_sources: Vec<String>,

    #[serde(default = "QualityConfig::default_suspicious")]
    pub suspicious: Vec<SuspiciousCombination>,
}

impl QualityConfig {
    fn default_min_key_confidence() -> f64 {
        0.70
    }

    fn default_min_distinct_chords() -> usize {
        3
    }

    fn default_min_chord_events() -> usize {
        4
    }

    fn default_excluded_sources() -> Vec<String> {
        vec![
            // wrong key and wrong chords in the source file
            "25_Eagles-Hotel_California".to_string(),
            // melody only
            "81_B_B__King-The_Thrill_Is_Gone".to_string(),
        ]
    }

    fn default_suspicious() -> Vec<SuspiciousCombination> {
        vec![SuspiciousCombination {
            numerator: 12,
            denominator: 8,
            tonic: 7,
        }]
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_key_confidence: Self::default_min_key_confidence(),
            min_distinct_chords: Self::default_min_distinct_chords(),
            min_chord_events: Self::default_min_chord_events(),
            excluded_sources: Self::default_excluded_sources(),
            suspicious: Self::default_suspicious(),
        }
    }
}

/// Difficulty scoring weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Added once if any seventh chord appears.
    #[serde(default = "DifficultyConfig::default_seventh_bonus")]
    pub seventh_bonus: u32,

    /// Added once if any 9th/11th/13th chord appears.
    #[serde(default = "DifficultyConfig::default_extended_bonus")]
    pub extended_bonus: u32,

    /// Added once if any altered chord appears.
    #[serde(default = "DifficultyConfig::default_altered_bonus")]
    pub altered_bonus: u32,

    /// Added once if sections disagree on their local key.
    #[serde(default = "DifficultyConfig::default_modulation_bonus")]
    pub modulation_bonus: u32,

    /// Default: 10
    #[serde(default = "DifficultyConfig::default_intermediate_at")]
    pub intermediate_at: u32,

    /// Default: 20
    #[serde(default = "DifficultyConfig::default_advanced_at")]
    pub advanced_at: u32,
}

impl DifficultyConfig {
    fn default_seventh_bonus() -> u32 {
        2
    }

    fn default_extended_bonus() -> u32 {
        3
    }

    fn default_altered_bonus() -> u32 {
        4
    }

    fn default_modulation_bonus() -> u32 {
        5
    }

    fn default_intermediate_at() -> u32 {
        10
    }

    fn default_advanced_at() -> u32 {
        20
    }
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            seventh_bonus: Self::default_seventh_bonus(),
            extended_bonus: Self::default_extended_bonus(),
            altered_bonus: Self::default_altered_bonus(),
            modulation_bonus: Self::default_modulation_bonus(),
            intermediate_at: Self::default_intermediate_at(),
            advanced_at: Self::default_advanced_at(),
        }
    }
}

/// Header values used when the decoded source carries none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "DefaultsConfig::default_tempo_bpm")]
    pub tempo_bpm: u32,

    #[serde(default = "DefaultsConfig::default_numerator")]
    pub numerator: u8,

    #[serde(default = "DefaultsConfig::default_denominator")]
    pub denominator: u8,
}

impl DefaultsConfig {
    fn default_tempo_bpm() -> u32 {
        120
    }

    fn default_numerator() -> u8 {
        4
    }

    fn default_denominator() -> u8 {
        4
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: Self::default_tempo_bpm(),
            numerator: Self::default_numerator(),
            denominator: Self::default_denominator(),
        }
    }
}

/// Replacement time signature for one song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureOverride {
    pub numerator: u8,
    pub denominator: u8,
}

/// Per-song corrections applied verbatim, keyed by exact identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverridesConfig {
    #[serde(default = "OverridesConfig::default_time_signatures")]
    pub time_signatures: BTreeMap<String, SignatureOverride>,
}

impl OverridesConfig {
    fn default_time_signatures() -> BTreeMap<String, SignatureOverride> {
        let mut table = BTreeMap::new();
        table.insert(
            "33_Dave_Brubeck-Take_Five".to_string(),
            SignatureOverride {
                numerator: 5,
                denominator: 4,
            },
        );
        table
    }
}

impl Default for OverridesConfig {
    fn default() -> Self {
        Self {
            time_signatures: Self::default_time_signatures(),
        }
    }
}
