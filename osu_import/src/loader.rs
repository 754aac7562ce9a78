use std::{
    fs,
    path::{Path, PathBuf},
};

use song_schema::{Chart, Song, TimingData};
use tracing::{debug, warn};

use crate::{
    classify::classify_and_prepare_chart,
    document::{parse_document, ParsedDocument, SECTION_COUNT},
    metadata::set_metadata,
    notes::populate_note_data,
    timing::set_timing_data,
    ImportError, ImportErrorKind, ImportOptions,
};

/// Beatmap files in `dir` with the configured extension, sorted by path.
pub fn applicable_files(dir: &Path, options: &ImportOptions) -> Result<Vec<PathBuf>, ImportError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ImportError::new("E2002", format!("failed to list {}: {e}", dir.display()))
            .with_file(dir.display().to_string())
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, &options.extension))
        .collect();
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Lossy UTF-8 decode with a leading byte-order mark removed.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

fn read_document(path: &Path) -> Result<ParsedDocument, ImportError> {
    let bytes = fs::read(path).map_err(|e| {
        ImportError::new("E2001", format!("failed to read {}: {e}", path.display()))
            .with_file(path.display().to_string())
    })?;
    Ok(parse_document(&decode_text(&bytes)))
}

fn require_structure(doc: &ParsedDocument) -> Result<(), ImportError> {
    if doc.is_empty() {
        return Err(ImportError::new(
            "E1001",
            format!("not a beatmap: expected {SECTION_COUNT} sections"),
        ));
    }
    Ok(())
}

/// Runs the whole per-file pipeline on a parsed document and appends the
/// resulting chart to `song`.
///
/// `primary` marks the file whose metadata and tempo timeline describe the
/// song. Nothing is appended when any stage fails.
pub fn import_document(
    doc: &ParsedDocument,
    song: &mut Song,
    filename: &str,
    primary: bool,
    options: &ImportOptions,
) -> Result<(), ImportError> {
    require_structure(doc)?;

    // a malformed timing field leaves the song untouched
    if primary {
        set_timing_data(doc, song)?;
        set_metadata(doc, song);
    }

    let mut chart = song.create_chart(filename);
    classify_and_prepare_chart(doc, song, &mut chart, options)?;
    populate_note_data(doc, &mut song.timing, &mut chart)?;
    song.add_chart(chart);
    Ok(())
}

pub fn import_chart_str(
    src: &str,
    song: &mut Song,
    filename: &str,
    primary: bool,
    options: &ImportOptions,
) -> Result<(), ImportError> {
    import_document(&parse_document(src), song, filename, primary, options)
        .map_err(|e| e.with_file(filename))
}

/// Loads every beatmap in `dir` into one song.
///
/// The first listed file supplies song metadata and timing. A file that fails
/// is logged and skipped; only failing to list `dir` is an error.
pub fn load_song_from_dir(dir: &Path, options: &ImportOptions) -> Result<Song, ImportError> {
    let files = applicable_files(dir, options)?;
    let mut song = Song::default();

    for (idx, path) in files.iter().enumerate() {
        let file = path.display().to_string();
        let result = read_document(path)
            .and_then(|doc| import_document(&doc, &mut song, &file, idx == 0, options));

        match result {
            Ok(()) => debug!(file = %file, charts = song.charts.len(), "loaded chart"),
            Err(e) if e.kind == ImportErrorKind::Structure => {
                debug!(file = %file, "skipping: {e}");
            }
            Err(e) => warn!(file = %file, "discarding chart: {e}"),
        }
    }

    if files.is_empty() {
        debug!(dir = %dir.display(), "no beatmap files found");
    }
    Ok(song)
}

/// Re-reads one beatmap file and replaces `chart`'s note data.
pub fn load_note_data_from_file(
    path: &Path,
    timing: &mut TimingData,
    chart: &mut Chart,
) -> Result<(), ImportError> {
    let file = path.display().to_string();
    let doc = read_document(path)?;
    require_structure(&doc).map_err(|e| e.with_file(file.as_str()))?;
    populate_note_data(&doc, timing, chart).map_err(|e| e.with_file(file))
}
