use std::collections::HashSet;

use sheetconf::DifficultyConfig;

use crate::quality::distinct_symbols;
use crate::types::{ChordEvent, ChordFamily, Difficulty, Section};

/// A difficulty rating and the score behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyScore {
    pub score: u32,
    pub level: Difficulty,
}

/// Rate how hard a song is to play from its chords.
///
/// The score starts at the number of distinct chord symbols. Each bonus is
/// added once when present: seventh chords, extended chords, altered chords,
/// and a modulation (sections carrying more than one distinct local key).
pub fn rate_difficulty(
    chords: &[ChordEvent],
    sections: &[Section],
    config: &DifficultyConfig,
) -> DifficultyScore {
    let families: HashSet<ChordFamily> = chords.iter().map(|c| c.quality.family()).collect();

    let mut score = distinct_symbols(chords) as u32;
    if families.contains(&ChordFamily::Seventh) {
        score += config.seventh_bonus;
    }
    if families.contains(&ChordFamily::Extended) {
        score += config.extended_bonus;
    }
    if families.contains(&ChordFamily::Altered) {
        score += config.altered_bonus;
    }

    let local_keys: HashSet<_> = sections
        .iter()
        .filter_map(|s| s.local_key.as_ref())
        .map(|k| (k.tonic, k.mode))
        .collect();
    if local_keys.len() > 1 {
        score += config.modulation_bonus;
    }

    DifficultyScore {
        score,
        level: level_for(score, config),
    }
}

fn level_for(score: u32, config: &DifficultyConfig) -> Difficulty {
    if score < config.intermediate_at {
        Difficulty::Beginner
    } else if score < config.advanced_at {
        Difficulty::Intermediate
    } else {
        Difficulty::Advanced
    }
}
