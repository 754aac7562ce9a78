use song_schema::{BpmSegment, DisplayBpm, Song, TimingData, DEFAULT_BPM, ROWS_PER_BEAT};
use tracing::debug;

use crate::{
    document::ParsedDocument,
    fields::{records, required_float},
    ImportError,
};

/// A `TimingPoints` record: positive values are milliseconds per beat,
/// non-positive values scale the last absolute tempo by `|value| / 100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoChangePoint {
    pub offset_ms: i64,
    pub value: f64,
}

pub fn parse_tempo_points(doc: &ParsedDocument) -> Result<Vec<TempoChangePoint>, ImportError> {
    records(doc, "TimingPoints")
        .map(|record| {
            Ok(TempoChangePoint {
                offset_ms: record.int(0)?,
                value: record.float(1)?,
            })
        })
        .collect()
}

/// Resolves tempo points to `(offset_ms, bpm)` pairs ordered by offset.
/// Offsets are clamped at 0 and a point sharing the previous pair's offset
/// replaces it.
pub fn resolve_bpms(points: &[TempoChangePoint]) -> Vec<(i64, f64)> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.offset_ms);

    let mut bpms: Vec<(i64, f64)> = Vec::new();
    let mut last_positive_bpm = 0.0;
    for point in sorted {
        let offset = point.offset_ms.max(0);
        let bpm = if point.value > 0.0 {
            last_positive_bpm = 60000.0 / point.value;
            last_positive_bpm
        } else {
            last_positive_bpm * (point.value / 100.0).abs()
        };

        match bpms.last_mut() {
            Some(last) if last.0 == offset => last.1 = bpm,
            _ => bpms.push((offset, bpm)),
        }
    }
    bpms
}

/// Row reached `ms` milliseconds after beat zero, at [`ROWS_PER_BEAT`] rows per beat.
///
/// The timeline's stored beat-zero offset is ignored; the conversion always
/// measures from a zero offset and never mutates the timeline. Times past the
/// last representable row are an E3001 error.
pub fn ms_to_row(timing: &TimingData, ms: i64) -> Result<u32, ImportError> {
    let beat = timing
        .beat_from_elapsed_time(ms as f64 / 1000.0, 0.0)
        .ok_or_else(|| ImportError::new("E5001", "no tempo segments installed"))?;
    let row = (beat.abs() * ROWS_PER_BEAT as f64).round();
    if !(0.0..=u32::MAX as f64).contains(&row) {
        return Err(ImportError::new(
            "E3001",
            format!("{ms}ms is out of row range"),
        ));
    }
    Ok(row as u32)
}

/// Installs the song tempo timeline and sample preview window.
pub fn set_timing_data(doc: &ParsedDocument, song: &mut Song) -> Result<(), ImportError> {
    let points = parse_tempo_points(doc)?;
    let lead_in_ms = required_float(doc, "General", "AudioLeadIn")?;
    let preview_ms = required_float(doc, "General", "PreviewTime")?;

    let bpms = resolve_bpms(&points);

    let mut timing = TimingData {
        beat0_offset_seconds: song.timing.beat0_offset_seconds,
        bpm_segments: Vec::new(),
    };
    let initial_bpm = bpms.first().map_or(DEFAULT_BPM, |&(_, bpm)| bpm);
    timing.add_bpm_segment(BpmSegment::new(0, initial_bpm));

    for &(offset_ms, bpm) in &bpms {
        let row = ms_to_row(&timing, offset_ms)?;
        if row != 0 {
            timing.add_bpm_segment(BpmSegment::new(row, bpm));
        }
    }
    debug!(
        points = points.len(),
        segments = timing.bpm_segments.len(),
        "installed tempo timeline"
    );

    song.timing = timing;
    song.display_bpm = DisplayBpm::Actual;
    song.music_sample_start_seconds = lead_in_ms / 1000.0;
    song.music_sample_length_seconds = preview_ms / 1000.0;
    Ok(())
}
