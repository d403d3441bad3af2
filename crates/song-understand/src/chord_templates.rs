use crate::types::ChordQuality;

/// A chord pattern: quality + interval set from root (as bitmask over 12 pitch classes)
/// + a static desirability score used to pick between candidate roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordTemplate {
    pub quality: ChordQuality,
    pub intervals: u16, // bitmask: bit i set means interval i is in the template
    pub score: u8,
}

impl ChordTemplate {
    pub const fn new(quality: ChordQuality, intervals: &[u8], score: u8) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < intervals.len() {
            mask |= 1 << (intervals[i] % 12);
            i += 1;
        }
        Self {
            quality,
            intervals: mask,
            score,
        }
    }
}

/// Score given to a voicing that matches no pattern and is labeled a bare major triad.
pub const FALLBACK_SCORE: u8 = 5;

/// All recognized chord patterns. Compound intervals are folded into one
/// octave: a 9th is 2, an 11th is 5, a 13th is 9.
pub static TEMPLATES: &[ChordTemplate] = &[
    // Triads
    ChordTemplate::new(ChordQuality::Major, &[0, 4, 7], 10),
    ChordTemplate::new(ChordQuality::Minor, &[0, 3, 7], 10),
    ChordTemplate::new(ChordQuality::Diminished, &[0, 3, 6], 9),
    ChordTemplate::new(ChordQuality::Augmented, &[0, 4, 8], 9),
    // Sevenths
    ChordTemplate::new(ChordQuality::Dominant7, &[0, 4, 7, 10], 10),
    ChordTemplate::new(ChordQuality::Major7, &[0, 4, 7, 11], 10),
    ChordTemplate::new(ChordQuality::Minor7, &[0, 3, 7, 10], 10),
    ChordTemplate::new(ChordQuality::HalfDiminished7, &[0, 3, 6, 10], 9),
    ChordTemplate::new(ChordQuality::Diminished7, &[0, 3, 6, 9], 9),
    ChordTemplate::new(ChordQuality::MinorMajor7, &[0, 3, 7, 11], 8),
    // Suspended
    ChordTemplate::new(ChordQuality::Suspended2, &[0, 2, 7], 9),
    ChordTemplate::new(ChordQuality::Suspended4, &[0, 5, 7], 9),
    ChordTemplate::new(ChordQuality::Dominant7Sus4, &[0, 5, 7, 10], 9),
    // Sixths
    ChordTemplate::new(ChordQuality::Major6, &[0, 4, 7, 9], 9),
    ChordTemplate::new(ChordQuality::Minor6, &[0, 3, 7, 9], 9),
    // Extended
    ChordTemplate::new(ChordQuality::Dominant9, &[0, 4, 7, 10, 14], 9),
    ChordTemplate::new(ChordQuality::Major9, &[0, 4, 7, 11, 14], 9),
    ChordTemplate::new(ChordQuality::Minor9, &[0, 3, 7, 10, 14], 9),
    ChordTemplate::new(ChordQuality::Dominant11, &[0, 4, 7, 10, 14, 17], 8),
    ChordTemplate::new(ChordQuality::Dominant13, &[0, 4, 7, 10, 14, 21], 8),
    // Added tones
    ChordTemplate::new(ChordQuality::Add9, &[0, 4, 7, 14], 8),
    ChordTemplate::new(ChordQuality::MinorAdd9, &[0, 3, 7, 14], 8),
    // Altered
    ChordTemplate::new(ChordQuality::Dominant7Flat9, &[0, 4, 7, 10, 13], 8),
    ChordTemplate::new(ChordQuality::Dominant7Sharp9, &[0, 4, 7, 10, 15], 8),
    ChordTemplate::new(ChordQuality::Dominant7Flat5, &[0, 4, 6, 10], 7),
    ChordTemplate::new(ChordQuality::Dominant7Sharp5, &[0, 4, 8, 10], 7),
    // Dyad
    ChordTemplate::new(ChordQuality::Power, &[0, 7], 7),
];

/// Pitch class names. Sharps and flats are fixed per pitch class and do
/// not depend on the key.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

pub fn note_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES[(pitch_class % 12) as usize]
}

/// A labeled pitch-class set.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordMatch {
    pub root_pitch_class: u8,
    pub root: &'static str,
    pub quality: ChordQuality,
    pub symbol: String,
    pub score: u8,
}

/// Convert a set of pitch classes to an interval bitmask relative to a root.
fn to_interval_mask(pitch_classes: &[u8], root: u8) -> u16 {
    let mut mask = 0u16;
    for &pc in pitch_classes {
        let interval = (pc % 12 + 12 - root % 12) % 12;
        mask |= 1 << interval;
    }
    mask
}

/// Label a set of pitch classes using the built-in patterns.
pub fn identify_chord(pitch_classes: &[u8]) -> Option<ChordMatch> {
    identify_chord_with(pitch_classes, TEMPLATES)
}

/// Label a set of pitch classes.
///
/// Each distinct pitch class present is tried as the root, lowest first;
/// the interval set relative to that root must equal a template exactly.
/// The highest scoring match wins and a tie keeps the lower root. When
/// nothing matches, the set is called a major chord on its lowest pitch
/// class with [`FALLBACK_SCORE`]. Fewer than two distinct pitch classes
/// is never a chord.
pub fn identify_chord_with(
    pitch_classes: &[u8],
    templates: &[ChordTemplate],
) -> Option<ChordMatch> {
    let mut distinct: Vec<u8> = pitch_classes.iter().map(|pc| pc % 12).collect();
    distinct.sort_unstable();
    distinct.dedup();

    if distinct.len() < 2 {
        return None;
    }

    let mut best: Option<(u8, &ChordTemplate)> = None;
    for &root in &distinct {
        let intervals = to_interval_mask(&distinct, root);
        let Some(template) = templates.iter().find(|t| t.intervals == intervals) else {
            continue;
        };
        if best.map_or(true, |(_, b)| template.score > b.score) {
            best = Some((root, template));
        }
    }

    let (root, quality, score) = match best {
        Some((root, template)) => (root, template.quality, template.score),
        None => (distinct[0], ChordQuality::Major, FALLBACK_SCORE),
    };

    let root_name = note_name(root);
    Some(ChordMatch {
        root_pitch_class: root,
        root: root_name,
        quality,
        symbol: format!("{}{}", root_name, quality.suffix()),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(pcs: &[u8]) -> String {
        identify_chord(pcs).unwrap().symbol
    }

    #[test]
    fn c_major_triad() {
        let result = identify_chord(&[0, 4, 7]).unwrap();
        assert_eq!(result.root_pitch_class, 0);
        assert_eq!(result.symbol, "C");
        assert_eq!(result.quality, ChordQuality::Major);
        assert_eq!(result.quality.suffix(), "");
        assert_eq!(result.score, 10);
    }

    #[test]
    fn c_minor_triad() {
        let result = identify_chord(&[0, 3, 7]).unwrap();
        assert_eq!(result.symbol, "Cm");
        assert_eq!(result.quality, ChordQuality::Minor);
    }

    #[test]
    fn c_dominant_7th() {
        let result = identify_chord(&[0, 4, 7, 10]).unwrap();
        assert_eq!(result.symbol, "C7");
        assert_eq!(result.quality, ChordQuality::Dominant7);
    }

    #[test]
    fn inversions_find_true_root() {
        // G B D given in any order
        assert_eq!(symbol(&[2, 7, 11]), "G");
        // A C E
        assert_eq!(symbol(&[0, 4, 9]), "Am");
        // F A C
        assert_eq!(symbol(&[0, 5, 9]), "F");
        // G B D F
        assert_eq!(symbol(&[7, 11, 2, 5]), "G7");
    }

    #[test]
    fn higher_score_beats_lower_root() {
        // C E G A: C6 (9) vs Am7 (10)
        let result = identify_chord(&[0, 4, 7, 9]).unwrap();
        assert_eq!(result.symbol, "Am7");
    }

    #[test]
    fn symmetric_chord_takes_lowest_root() {
        // every note of a diminished seventh is an equally good root
        let result = identify_chord(&[2, 5, 8, 11]).unwrap();
        assert_eq!(result.symbol, "Ddim7");
        let result = identify_chord(&[0, 4, 8]).unwrap();
        assert_eq!(result.symbol, "Caug");
    }

    #[test]
    fn extended_chords_fold_to_one_octave() {
        assert_eq!(symbol(&[0, 2, 4, 7, 10]), "C9");
        assert_eq!(symbol(&[0, 2, 4, 7, 9, 10]), "C13");
        assert_eq!(symbol(&[0, 1, 4, 7, 10]), "C7b9");
        assert_eq!(symbol(&[0, 2, 4, 7]), "Cadd9");
    }

    #[test]
    fn unknown_voicing_falls_back_to_major_on_lowest() {
        // C C# D
        let result = identify_chord(&[2, 1, 0]).unwrap();
        assert_eq!(result.symbol, "C");
        assert_eq!(result.quality, ChordQuality::Major);
        assert_eq!(result.score, FALLBACK_SCORE);
    }

    #[test]
    fn accidentals_come_from_fixed_table() {
        assert_eq!(symbol(&[1, 5, 8]), "C#");
        assert_eq!(symbol(&[3, 7, 10]), "Eb");
        assert_eq!(symbol(&[8, 0, 3]), "Ab");
        assert_eq!(symbol(&[6, 10, 1]), "F#");
        assert_eq!(symbol(&[10, 2, 5]), "Bb");
        assert_eq!(symbol(&[1, 4, 8]), "C#m");
    }

    #[test]
    fn single_pitch_class_no_match() {
        assert!(identify_chord(&[0]).is_none());
        // octave doubling is still one pitch class
        assert!(identify_chord(&[0, 0]).is_none());
        assert!(identify_chord(&[]).is_none());
    }

    #[test]
    fn power_chord() {
        let result = identify_chord(&[0, 7]).unwrap();
        assert_eq!(result.symbol, "C5");
        assert_eq!(result.quality, ChordQuality::Power);
    }

    #[test]
    fn templates_are_unique() {
        for (i, a) in TEMPLATES.iter().enumerate() {
            for b in &TEMPLATES[i + 1..] {
                assert_ne!(a.intervals, b.intervals, "{:?} vs {:?}", a.quality, b.quality);
            }
        }
    }
}
