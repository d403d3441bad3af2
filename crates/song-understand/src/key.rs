use note_tracks::Note;

use crate::chord_templates::note_name;
use crate::types::{KeyEstimate, KeyMode};

/// Major and minor correlation templates, indexed by scale degree from the tonic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyProfiles {
    pub major: [f64; 12],
    pub minor: [f64; 12],
}

/// Krumhansl-Kessler probe-tone profiles.
pub const KRUMHANSL_KESSLER: KeyProfiles = KeyProfiles {
    major: [6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88],
    minor: [6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17],
};

/// Spelling of a key tonic, from the same table as chord roots.
pub fn tonic_name(pitch_class: u8) -> &'static str {
    note_name(pitch_class)
}

/// The estimate returned when there is nothing to count.
pub fn neutral_key() -> KeyEstimate {
    KeyEstimate {
        tonic: 0,
        tonic_name: "C".into(),
        mode: KeyMode::Major,
        confidence: 0.5,
        neutral_default: true,
    }
}

/// Note-count pitch-class histogram normalized to a distribution.
///
/// Returns `None` when there are no notes.
pub fn pitch_class_distribution<'a, I>(notes: I) -> Option<[f64; 12]>
where
    I: IntoIterator<Item = &'a Note>,
{
    let mut histogram = [0.0_f64; 12];
    let mut total = 0usize;
    for note in notes {
        histogram[note.pitch_class() as usize] += 1.0;
        total += 1;
    }

    if total == 0 {
        return None;
    }

    for h in &mut histogram {
        *h /= total as f64;
    }
    Some(histogram)
}

/// Detect the key of a note set with the Krumhansl-Kessler profiles.
pub fn detect_key<'a, I>(notes: I) -> KeyEstimate
where
    I: IntoIterator<Item = &'a Note>,
{
    detect_key_with(notes, &KRUMHANSL_KESSLER)
}

/// Detect the key of a note set using the Krumhansl-Schmuckler algorithm.
///
/// Every note counts once regardless of its length. With no notes the
/// neutral C major estimate is returned, flagged as such.
pub fn detect_key_with<'a, I>(notes: I, profiles: &KeyProfiles) -> KeyEstimate
where
    I: IntoIterator<Item = &'a Note>,
{
    match pitch_class_distribution(notes) {
        Some(distribution) => key_from_distribution(&distribution, profiles),
        None => neutral_key(),
    }
}

/// Correlate a pitch-class distribution against all 24 key profiles.
///
/// Tonics are tried from C upward, major before minor, and only a
/// strictly better correlation replaces the current best, so ties resolve
/// to the first candidate evaluated.
pub fn key_from_distribution(distribution: &[f64; 12], profiles: &KeyProfiles) -> KeyEstimate {
    let mut best_tonic: u8 = 0;
    let mut best_mode = KeyMode::Major;
    let mut best_corr = f64::NEG_INFINITY;

    for tonic in 0..12u8 {
        // Rotate distribution so tonic = index 0
        let mut rotated = [0.0; 12];
        for (i, slot) in rotated.iter_mut().enumerate() {
            *slot = distribution[(i + tonic as usize) % 12];
        }

        let major_corr = pearson(&rotated, &profiles.major);
        if major_corr > best_corr {
            best_corr = major_corr;
            best_tonic = tonic;
            best_mode = KeyMode::Major;
        }

        let minor_corr = pearson(&rotated, &profiles.minor);
        if minor_corr > best_corr {
            best_corr = minor_corr;
            best_tonic = tonic;
            best_mode = KeyMode::Minor;
        }
    }

    let confidence = ((best_corr + 1.0) / 2.0).clamp(0.0, 1.0);

    KeyEstimate {
        tonic: best_tonic,
        tonic_name: tonic_name(best_tonic).to_string(),
        mode: best_mode,
        confidence,
        neutral_default: false,
    }
}

/// Pearson correlation coefficient between two 12-element arrays.
pub fn pearson(x: &[f64; 12], y: &[f64; 12]) -> f64 {
    let x_mean: f64 = x.iter().sum::<f64>() / 12.0;
    let y_mean: f64 = y.iter().sum::<f64>() / 12.0;

    let mut num = 0.0;
    let mut x_sq = 0.0;
    let mut y_sq = 0.0;

    for i in 0..12 {
        let xd = x[i] - x_mean;
        let yd = y[i] - y_mean;
        num += xd * yd;
        x_sq += xd * xd;
        y_sq += yd * yd;
    }

    let denom = (x_sq * y_sq).sqrt();
    if denom < 1e-10 {
        return 0.0;
    }
    num / denom
}
