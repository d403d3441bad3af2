use crate::note::{Track, TrackStats};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Register weights used to rank tracks for harmony extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionParams {
    /// Mean pitch range treated as chordal, inclusive. Default: 48..=72.
    pub chord_range: (f64, f64),
    /// Multiplier for tracks in the chordal range. Default: 2.0.
    pub chord_range_weight: f64,
    /// Multiplier for tracks below the chordal range. Default: 1.5.
    pub bass_weight: f64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            chord_range: (48.0, 72.0),
            chord_range_weight: 2.0,
            bass_weight: 1.5,
        }
    }
}

/// The winning track and why it won.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSelection<'a> {
    pub index: usize,
    pub track: &'a Track,
    pub stats: TrackStats,
    pub score: f64,
}

/// Score a track by size, weighted toward chordal and bass registers.
pub fn score_track(stats: &TrackStats, params: &SelectionParams) -> f64 {
    let mut score = stats.note_count as f64;
    let (low, high) = params.chord_range;
    if stats.mean_pitch >= low && stats.mean_pitch <= high {
        score *= params.chord_range_weight;
    }
    if stats.mean_pitch < low {
        score *= params.bass_weight;
    }
    score
}

/// Pick the track most likely to carry harmony, using default weights.
pub fn select_track(tracks: &[Track]) -> Result<TrackSelection<'_>> {
    select_track_with(tracks, &SelectionParams::default())
}

/// Pick the track most likely to carry harmony.
///
/// Empty tracks are skipped. The highest score wins; on a tie the
/// earlier track is kept.
pub fn select_track_with<'a>(
    tracks: &'a [Track],
    params: &SelectionParams,
) -> Result<TrackSelection<'a>> {
    let mut best: Option<TrackSelection<'a>> = None;

    for (index, track) in tracks.iter().enumerate() {
        if track.is_empty() {
            continue;
        }

        let stats = track.stats();
        let score = score_track(&stats, params);
        debug!(
            index,
            notes = stats.note_count,
            mean_pitch = stats.mean_pitch,
            low = stats.pitch_min,
            high = stats.pitch_max,
            score,
            "scored track"
        );

        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(TrackSelection {
                index,
                track,
                stats,
                score,
            });
        }
    }

    best.ok_or(Error::NoUsableTrack)
}

/// Use a caller-chosen track instead of scoring.
pub fn select_index<'a>(
    tracks: &'a [Track],
    index: usize,
    params: &SelectionParams,
) -> Result<TrackSelection<'a>> {
    let track = tracks
        .get(index)
        .filter(|t| !t.is_empty())
        .ok_or(Error::TrackOutOfRange {
            index,
            count: tracks.len(),
        })?;
    let stats = track.stats();
    let score = score_track(&stats, params);
    Ok(TrackSelection {
        index,
        track,
        stats,
        score,
    })
}
