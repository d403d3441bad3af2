//! Converters built from TOML configuration on disk.

use std::io::Write;

use note_tracks::{Note, Track};
use pretty_assertions::assert_eq;
use song_understand::{RejectionReason, SongConverter, SongInput};
use tempfile::NamedTempFile;

fn progression() -> Track {
    let shapes: [&[u8]; 4] = [&[60, 64, 67], &[55, 59, 62], &[57, 60, 64], &[53, 57, 60]];
    let notes = (0..8)
        .flat_map(|bar| {
            shapes[bar % 4]
                .iter()
                .map(move |&p| Note::new(p, bar as f64 * 4.0, 4.0))
        })
        .collect();
    Track::new(notes)
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn shorter_sections_from_file() {
    let file = config_file(
        r#"
[sections]
max_bars = 4
"#,
    );
    let converter = SongConverter::from_config_file(Some(file.path())).unwrap();
    assert_eq!(converter.config().sections.max_bars, 4);

    let song = converter
        .convert(&SongInput::new("01_Synthetic-Pop", vec![progression()]))
        .unwrap();
    let names: Vec<_> = song.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Intro", "Outro"]);
    assert_eq!(song.total_bars(), 8);

    // a chordless song's placeholder obeys the same limit
    let melody = Track::new((0..8).map(|i| Note::new(72 + i, f64::from(i), 1.0)).collect());
    let song = converter
        .convert(&SongInput::new("02_Synthetic-Melody", vec![melody]))
        .unwrap();
    assert_eq!(song.sections.len(), 1);
    assert_eq!(song.sections[0].name, "Main");
    assert_eq!(song.sections[0].bar_count, 4);
    assert!(song.sections.iter().all(|s| s.bar_count <= 4));
}

#[test]
fn exclusion_list_from_file() {
    let file = config_file(
        r#"
[quality]
excluded_sources = ["01_Synthetic-Pop"]
"#,
    );
    let converter = SongConverter::from_config_file(Some(file.path())).unwrap();

    let song = converter
        .convert(&SongInput::new("01_Synthetic-Pop", vec![progression()]))
        .unwrap();
    assert_eq!(song.quality.reasons(), &[RejectionReason::KnownBadSource]);

    // the replaced list no longer carries the stock entries
    let song = converter
        .convert(&SongInput::new("25_Eagles-Hotel_California", vec![progression()]))
        .unwrap();
    assert!(song.is_accepted());
}

#[test]
fn invalid_file_is_reported_with_context() {
    let file = config_file("[sections]\nmax_bars = 0\n");
    let err = match SongConverter::from_config_file(Some(file.path())) {
        Ok(_) => panic!("zero max_bars accepted"),
        Err(e) => e,
    };
    let chain = format!("{err:#}");
    assert!(chain.contains("loading converter config"), "{chain}");
    assert!(chain.contains("max_bars"), "{chain}");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = config_file("[sections\nmax_bars = ");
    assert!(SongConverter::from_config_file(Some(file.path())).is_err());
}
