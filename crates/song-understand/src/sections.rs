use note_tracks::{Note, TimeSignature};
use sheetconf::SectionsConfig;

use crate::key::detect_key;
use crate::types::{ChordEvent, Measure, Section};

/// One measure per bar from 0 through the last bar holding a chord onset.
///
/// A bar takes the first chord that starts in it. Bars without an onset
/// are left as "no chord"; a held chord is not carried forward. Chords at
/// or past `bar_limit` are dropped.
pub fn measures_from_chords(
    chords: &[ChordEvent],
    time_signature: &TimeSignature,
    bar_limit: usize,
) -> Vec<Measure> {
    let Some(last_bar) = chords.iter().map(|c| c.bar).filter(|&b| b < bar_limit).max() else {
        return Vec::new();
    };

    let mut measures = vec![
        Measure {
            chord: None,
            time_signature: *time_signature,
        };
        last_bar + 1
    ];

    for chord in chords.iter().filter(|c| c.bar <= last_bar) {
        let measure = &mut measures[chord.bar];
        if measure.chord.is_none() {
            measure.chord = Some(chord.clone());
        }
    }

    measures
}

/// Positional section label.
///
/// The first section is an Intro when short, the last an Outro when short,
/// the rest walk the configured rotation and then fall back to "Section N".
pub fn section_name(index: usize, bars: usize, is_last: bool, config: &SectionsConfig) -> String {
    if index == 0 && bars <= config.short_section_bars {
        return "Intro".to_string();
    }

    if index > 0 && is_last && bars <= config.short_section_bars {
        return "Outro".to_string();
    }

    if index > 0 {
        if let Some(name) = config.rotation.get(index - 1) {
            return name.clone();
        }
    }

    format!("Section {}", index + 1)
}

/// Split the chord sequence into bounded, named sections.
///
/// Sections are filled bar by bar and closed at `max_bars` or at the end
/// of the song, so the bar counts always sum to the measure count. A song
/// without chords gets a single "Main" section of empty bars, no longer
/// than `max_bars`. Chords past `max_song_bars` are ignored; callers that
/// must not lose them check the length first.
pub fn segment_sections(
    chords: &[ChordEvent],
    time_signature: &TimeSignature,
    config: &SectionsConfig,
) -> Vec<Section> {
    let max_bars = config.max_bars.max(1);
    let measures = measures_from_chords(chords, time_signature, config.max_song_bars);

    if measures.is_empty() {
        let bars = config.empty_song_bars.min(max_bars);
        return vec![Section {
            name: "Main".to_string(),
            bar_count: bars,
            measures: vec![
                Measure {
                    chord: None,
                    time_signature: *time_signature,
                };
                bars
            ],
            local_key: None,
        }];
    }

    let section_count = measures.len().div_ceil(max_bars);

    measures
        .chunks(max_bars)
        .enumerate()
        .map(|(index, chunk)| Section {
            name: section_name(index, chunk.len(), index + 1 == section_count, config),
            bar_count: chunk.len(),
            measures: chunk.to_vec(),
            local_key: None,
        })
        .collect()
}

/// Estimate a key for each section from the notes starting inside its bars.
///
/// Sections with fewer than `min_notes` notes keep no local key.
pub fn with_local_keys(
    sections: Vec<Section>,
    notes: &[Note],
    time_signature: &TimeSignature,
    min_notes: usize,
) -> Vec<Section> {
    let mut first_bar = 0;
    sections
        .into_iter()
        .map(|mut section| {
            let bars = first_bar..first_bar + section.bar_count;
            first_bar = bars.end;

            let inside: Vec<&Note> = notes
                .iter()
                .filter(|n| bars.contains(&time_signature.bar_of(n.onset)))
                .collect();
            if !inside.is_empty() && inside.len() >= min_notes {
                section.local_key = Some(detect_key(inside));
            }
            section
        })
        .collect()
}
