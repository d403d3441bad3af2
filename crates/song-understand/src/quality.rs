use std::collections::HashSet;

use note_tracks::TimeSignature;
use sheetconf::QualityConfig;

use crate::types::{ChordEvent, KeyEstimate, QualityStatus, RejectionReason};

/// Count distinct chord symbols.
pub fn distinct_symbols(chords: &[ChordEvent]) -> usize {
    chords
        .iter()
        .map(|c| c.symbol.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Run every rule and collect the reasons that fire.
///
/// Rules are checked in a fixed order so the reason list is stable: known
/// bad source, key confidence, chord variety, chord data, then suspicious
/// time signature and tonic pairings.
pub fn evaluate(
    identifier: &str,
    key: &KeyEstimate,
    chords: &[ChordEvent],
    time_signature: &TimeSignature,
    config: &QualityConfig,
) -> QualityStatus {
    let mut reasons = Vec::new();

    if config.excluded_sources.iter().any(|s| s == identifier) {
        reasons.push(RejectionReason::KnownBadSource);
    }

    if key.confidence < config.min_key_confidence {
        reasons.push(RejectionReason::LowKeyConfidence);
    }

    if distinct_symbols(chords) < config.min_distinct_chords {
        reasons.push(RejectionReason::InsufficientChordVariety);
    }

    if chords.len() < config.min_chord_events {
        reasons.push(RejectionReason::InsufficientChordData);
    }

    let suspicious = config.suspicious.iter().any(|combo| {
        time_signature.matches(combo.numerator, combo.denominator) && key.tonic == combo.tonic
    });
    if suspicious {
        reasons.push(RejectionReason::SuspiciousSignatureKey);
    }

    if reasons.is_empty() {
        QualityStatus::Accepted
    } else {
        QualityStatus::Rejected { reasons }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChordQuality, KeyMode};
    use pretty_assertions::assert_eq;

    fn key(tonic: u8, confidence: f64) -> KeyEstimate {
        KeyEstimate {
            tonic,
            tonic_name: crate::key::tonic_name(tonic).to_string(),
            mode: KeyMode::Major,
            confidence,
            neutral_default: false,
        }
    }

    fn chords(symbols: &[&str]) -> Vec<ChordEvent> {
        symbols
            .iter()
            .enumerate()
            .map(|(i, s)| ChordEvent {
                symbol: s.to_string(),
                root_pitch_class: 0,
                root: s.to_string(),
                quality: ChordQuality::Major,
                start: i as f64 * 4.0,
                duration: 4.0,
                bar: i,
                score: 10,
            })
            .collect()
    }

    fn good_chords() -> Vec<ChordEvent> {
        chords(&["C", "G", "Am", "F"])
    }

    #[test]
    fn clean_song_is_accepted() {
        let status = evaluate(
            "01_Some-Song",
            &key(0, 0.9),
            &good_chords(),
            &TimeSignature::default(),
            &QualityConfig::default(),
        );
        assert_eq!(status, QualityStatus::Accepted);
    }

    #[test]
    fn two_chords_lack_variety() {
        let status = evaluate(
            "01_Some-Song",
            &key(0, 0.9),
            &chords(&["C", "G", "C", "G"]),
            &TimeSignature::default(),
            &QualityConfig::default(),
        );
        assert_eq!(
            status.reasons(),
            &[RejectionReason::InsufficientChordVariety]
        );
    }

    #[test]
    fn low_confidence_rejected() {
        let status = evaluate(
            "01_Some-Song",
            &key(0, 0.65),
            &good_chords(),
            &TimeSignature::default(),
            &QualityConfig::default(),
        );
        assert_eq!(status.reasons(), &[RejectionReason::LowKeyConfidence]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let status = evaluate(
            "01_Some-Song",
            &key(0, 0.70),
            &good_chords(),
            &TimeSignature::default(),
            &QualityConfig::default(),
        );
        assert!(status.is_accepted());
    }

    #[test]
    fn excluded_source_rejected() {
        let status = evaluate(
            "25_Eagles-Hotel_California",
            &key(0, 0.9),
            &good_chords(),
            &TimeSignature::default(),
            &QualityConfig::default(),
        );
        assert_eq!(status.reasons(), &[RejectionReason::KnownBadSource]);
    }

    #[test]
    fn twelve_eight_in_g_is_suspicious() {
        let config = QualityConfig::default();
        let status = evaluate(
            "01_Some-Song",
            &key(7, 0.9),
            &good_chords(),
            &TimeSignature::new(12, 8),
            &config,
        );
        assert_eq!(status.reasons(), &[RejectionReason::SuspiciousSignatureKey]);

        // mode is ignored
        let mut minor = key(7, 0.9);
        minor.mode = KeyMode::Minor;
        let status = evaluate(
            "01_Some-Song",
            &minor,
            &good_chords(),
            &TimeSignature::new(12, 8),
            &config,
        );
        assert!(status.has_reason(RejectionReason::SuspiciousSignatureKey));

        // same key in 4/4 is fine
        let status = evaluate(
            "01_Some-Song",
            &key(7, 0.9),
            &good_chords(),
            &TimeSignature::default(),
            &config,
        );
        assert!(status.is_accepted());
    }

    #[test]
    fn every_failing_rule_is_reported() {
        let status = evaluate(
            "81_B_B__King-The_Thrill_Is_Gone",
            &key(7, 0.5),
            &chords(&["G"]),
            &TimeSignature::new(12, 8),
            &QualityConfig::default(),
        );
        assert_eq!(
            status.reasons(),
            &[
                RejectionReason::KnownBadSource,
                RejectionReason::LowKeyConfidence,
                RejectionReason::InsufficientChordVariety,
                RejectionReason::InsufficientChordData,
                RejectionReason::SuspiciousSignatureKey,
            ]
        );
    }

    #[test]
    fn too_few_events_rejected() {
        let status = evaluate(
            "01_Some-Song",
            &key(0, 0.9),
            &chords(&["C", "G", "Am"]),
            &TimeSignature::default(),
            &QualityConfig::default(),
        );
        assert_eq!(status.reasons(), &[RejectionReason::InsufficientChordData]);
    }

    #[test]
    fn confidence_just_under_threshold_is_rejected() {
        use crate::key::{key_from_distribution, KRUMHANSL_KESSLER};

        // blend a weak distribution toward the C major profile until the
        // confidence sits just below 0.70
        let weak: [f64; 12] = std::array::from_fn(|i| if i < 6 { 1.0 / 6.0 } else { 0.0 });
        let total: f64 = KRUMHANSL_KESSLER.major.iter().sum();
        let strong = KRUMHANSL_KESSLER.major.map(|w| w / total);
        let blend = |t: f64| -> [f64; 12] {
            std::array::from_fn(|i| weak[i] + (strong[i] - weak[i]) * t)
        };
        let confidence = |t: f64| key_from_distribution(&blend(t), &KRUMHANSL_KESSLER).confidence;

        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..60 {
            let mid = (lo + hi) / 2.0;
            if confidence(mid) < 0.70 {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let key = key_from_distribution(&blend(lo), &KRUMHANSL_KESSLER);
        assert!(key.confidence < 0.70 && key.confidence > 0.6999, "{}", key.confidence);

        let status = evaluate(
            "01_Some-Song",
            &key,
            &good_chords(),
            &TimeSignature::default(),
            &QualityConfig::default(),
        );
        assert_eq!(status.reasons(), &[RejectionReason::LowKeyConfidence]);
    }
}
