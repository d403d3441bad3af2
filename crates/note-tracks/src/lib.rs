pub mod note;
pub mod select;

pub use note::{Note, TimeSignature, Track, TrackStats};
pub use select::{
    score_track, select_index, select_track, select_track_with, SelectionParams, TrackSelection,
};

/// Errors from track handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no usable track: every track is empty")]
    NoUsableTrack,

    #[error("track {index} is not usable ({count} tracks, or the track is empty)")]
    TrackOutOfRange { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
