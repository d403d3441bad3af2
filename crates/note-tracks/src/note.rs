use serde::{Deserialize, Serialize};

/// A single decoded note with beat-based timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch 0–127
    pub pitch: u8,
    /// Onset, in beats from the start of the song
    pub onset: f64,
    /// Length, in beats
    pub duration: f64,
}

impl Note {
    pub fn new(pitch: u8, onset: f64, duration: f64) -> Self {
        Self {
            pitch,
            onset,
            duration,
        }
    }

    pub fn pitch_class(&self) -> u8 {
        self.pitch % 12
    }
}

/// Meter as supplied by the source header or a per-song correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
    /// Beats counted per bar; the numerator for every meter we accept.
    pub beats_per_bar: u8,
}

impl TimeSignature {
    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
            beats_per_bar: numerator,
        }
    }

    pub fn matches(&self, numerator: u8, denominator: u8) -> bool {
        self.numerator == numerator && self.denominator == denominator
    }

    /// Bar index containing a beat position.
    pub fn bar_of(&self, beat: f64) -> usize {
        let beats_per_bar = f64::from(self.beats_per_bar.max(1));
        // nudge values a float error below a barline onto it
        let bar = (beat / beats_per_bar + 1e-9).floor();
        if bar.is_finite() && bar > 0.0 {
            bar as usize
        } else {
            0
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// One decoded note stream. Note order is not assumed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub name: Option<String>,
    pub notes: Vec<Note>,
}

impl Track {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { name: None, notes }
    }

    pub fn named(name: impl Into<String>, notes: Vec<Note>) -> Self {
        Self {
            name: Some(name.into()),
            notes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn stats(&self) -> TrackStats {
        TrackStats::from_notes(&self.notes)
    }
}

/// Register and size of a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackStats {
    pub note_count: usize,
    pub pitch_min: u8,
    pub pitch_max: u8,
    pub mean_pitch: f64,
}

impl TrackStats {
    pub fn from_notes(notes: &[Note]) -> Self {
        if notes.is_empty() {
            return Self {
                note_count: 0,
                pitch_min: 0,
                pitch_max: 0,
                mean_pitch: 0.0,
            };
        }

        let pitch_min = notes.iter().map(|n| n.pitch).min().unwrap_or(0);
        let pitch_max = notes.iter().map(|n| n.pitch).max().unwrap_or(0);
        let mean_pitch =
            notes.iter().map(|n| n.pitch as f64).sum::<f64>() / notes.len() as f64;

        Self {
            note_count: notes.len(),
            pitch_min,
            pitch_max,
            mean_pitch,
        }
    }
}
