use note_tracks::{TimeSignature, Track};
use serde::{Deserialize, Serialize};

/// Symbol shown for a bar with no chord onset.
pub const NO_CHORD: &str = "N.C.";

/// One song as handed over by the decoding collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongInput {
    /// Source identifier, e.g. the file stem "33_Dave_Brubeck-Take_Five".
    pub identifier: String,
    pub tracks: Vec<Track>,
    /// Header time signature, if the source carried one.
    #[serde(default)]
    pub time_signature: Option<TimeSignature>,
    /// First header tempo, if the source carried one.
    #[serde(default)]
    pub tempo_bpm: Option<f64>,
    /// Use this track for chords instead of the automatic choice.
    #[serde(default)]
    pub track_override: Option<usize>,
}

impl SongInput {
    pub fn new(identifier: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            identifier: identifier.into(),
            tracks,
            time_signature: None,
            tempo_bpm: None,
            track_override: None,
        }
    }

    pub fn with_time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.time_signature = Some(time_signature);
        self
    }

    pub fn with_tempo(mut self, bpm: f64) -> Self {
        self.tempo_bpm = Some(bpm);
        self
    }

    pub fn with_track_override(mut self, index: usize) -> Self {
        self.track_override = Some(index);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    Major,
    Minor,
}

impl std::fmt::Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMode::Major => write!(f, "major"),
            KeyMode::Minor => write!(f, "minor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEstimate {
    /// Pitch class 0–11 (C=0, C#=1, ...)
    pub tonic: u8,
    /// Tonic name: "C", "Eb", "F#", etc.
    pub tonic_name: String,
    pub mode: KeyMode,
    /// Best Pearson correlation rescaled from [-1, 1] to [0, 1]
    pub confidence: f64,
    /// True when no notes were available and the estimate is the C major fallback
    #[serde(default)]
    pub neutral_default: bool,
}

impl std::fmt::Display for KeyEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tonic_name, self.mode)
    }
}

/// Broad family of a chord quality, used for difficulty scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordFamily {
    Triad,
    Seventh,
    Sixth,
    Suspended,
    Extended,
    Added,
    Altered,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Dominant7,
    Major7,
    Minor7,
    HalfDiminished7,
    Diminished7,
    MinorMajor7,
    Suspended2,
    Suspended4,
    Dominant7Sus4,
    Major6,
    Minor6,
    Dominant9,
    Major9,
    Minor9,
    Dominant11,
    Dominant13,
    Add9,
    MinorAdd9,
    Dominant7Flat9,
    Dominant7Sharp9,
    Dominant7Flat5,
    Dominant7Sharp5,
    Power,
}

impl ChordQuality {
    /// Suffix for chord symbol display
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::HalfDiminished7 => "m7b5",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::MinorMajor7 => "mMaj7",
            ChordQuality::Suspended2 => "sus2",
            ChordQuality::Suspended4 => "sus4",
            ChordQuality::Dominant7Sus4 => "7sus4",
            ChordQuality::Major6 => "6",
            ChordQuality::Minor6 => "m6",
            ChordQuality::Dominant9 => "9",
            ChordQuality::Major9 => "maj9",
            ChordQuality::Minor9 => "m9",
            ChordQuality::Dominant11 => "11",
            ChordQuality::Dominant13 => "13",
            ChordQuality::Add9 => "add9",
            ChordQuality::MinorAdd9 => "madd9",
            ChordQuality::Dominant7Flat9 => "7b9",
            ChordQuality::Dominant7Sharp9 => "7#9",
            ChordQuality::Dominant7Flat5 => "7b5",
            ChordQuality::Dominant7Sharp5 => "7#5",
            ChordQuality::Power => "5",
        }
    }

    pub fn family(&self) -> ChordFamily {
        use ChordQuality::*;
        match self {
            Major | Minor | Diminished | Augmented => ChordFamily::Triad,
            Dominant7 | Major7 | Minor7 | HalfDiminished7 | Diminished7 | MinorMajor7
            | Dominant7Sus4 => ChordFamily::Seventh,
            Major6 | Minor6 => ChordFamily::Sixth,
            Suspended2 | Suspended4 => ChordFamily::Suspended,
            Dominant9 | Major9 | Minor9 | Dominant11 | Dominant13 => ChordFamily::Extended,
            Add9 | MinorAdd9 => ChordFamily::Added,
            Dominant7Flat9 | Dominant7Sharp9 | Dominant7Flat5 | Dominant7Sharp5 => {
                ChordFamily::Altered
            }
            Power => ChordFamily::Power,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordEvent {
    /// Full chord symbol: "Cmaj7", "Dm", "G7"
    pub symbol: String,
    pub root_pitch_class: u8,
    /// Root spelled for the song's key: "Bb", "F#"
    pub root: String,
    pub quality: ChordQuality,
    /// Beat position where this chord begins
    pub start: f64,
    /// Beats until the next simultaneity
    pub duration: f64,
    pub bar: usize,
    /// Desirability of the matched pattern; 5 marks an unrecognized voicing
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// None is "no chord" - bars are never filled with a guessed chord
    pub chord: Option<ChordEvent>,
    pub time_signature: TimeSignature,
}

impl Measure {
    pub fn symbol(&self) -> &str {
        self.chord.as_ref().map_or(NO_CHORD, |c| c.symbol.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Positional label (Intro, Verse, ...). A naming heuristic, not structural analysis.
    pub name: String,
    pub bar_count: usize,
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub local_key: Option<KeyEstimate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
        }
    }
}

/// Why the quality gate turned a song away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    KnownBadSource,
    LowKeyConfidence,
    InsufficientChordVariety,
    InsufficientChordData,
    SuspiciousSignatureKey,
    TimedOut,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KnownBadSource => "known-bad source",
            Self::LowKeyConfidence => "low key confidence",
            Self::InsufficientChordVariety => "insufficient chord variety",
            Self::InsufficientChordData => "insufficient chord data",
            Self::SuspiciousSignatureKey => "suspicious signature/key combination",
            Self::TimedOut => "timed out",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QualityStatus {
    Accepted,
    Rejected { reasons: Vec<RejectionReason> },
}

impl QualityStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, QualityStatus::Accepted)
    }

    pub fn reasons(&self) -> &[RejectionReason] {
        match self {
            QualityStatus::Accepted => &[],
            QualityStatus::Rejected { reasons } => reasons,
        }
    }

    pub fn has_reason(&self, reason: RejectionReason) -> bool {
        self.reasons().contains(&reason)
    }
}

/// Pipeline output for one song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub identifier: String,
    pub key: KeyEstimate,
    pub time_signature: TimeSignature,
    pub tempo_bpm: u32,
    pub sections: Vec<Section>,
    /// Only rated for accepted songs
    pub difficulty: Option<Difficulty>,
    pub quality: QualityStatus,
}

impl Song {
    pub fn total_bars(&self) -> usize {
        self.sections.iter().map(|s| s.bar_count).sum()
    }

    pub fn is_accepted(&self) -> bool {
        self.quality.is_accepted()
    }
}
