use song_schema::{Chart, ChartLayout, Difficulty, Song};

use crate::{document::ParsedDocument, fields::required_int, ImportError, ImportOptions};

/// `General.Mode` value of mania beatmaps.
pub const MANIA_MODE: i64 = 3;

pub(crate) fn layout_from_document(doc: &ParsedDocument) -> Result<ChartLayout, ImportError> {
    let lanes = required_int(doc, "Difficulty", "CircleSize")?;
    ChartLayout::from_lane_count(lanes).ok_or_else(|| {
        ImportError::new("E4002", format!("unsupported lane count: {lanes}"))
            .with_section("Difficulty")
            .with_key("CircleSize")
    })
}

/// Accepts a chart this loader understands and assigns its layout and
/// provisional difficulty.
///
/// The difficulty tier and meter follow how many charts `song` already holds.
/// On rejection the chart's layout is left unset.
pub fn classify_and_prepare_chart(
    doc: &ParsedDocument,
    song: &Song,
    chart: &mut Chart,
    options: &ImportOptions,
) -> Result<(), ImportError> {
    let mode = required_int(doc, "General", "Mode")?;
    if mode != options.mania_mode {
        return Err(
            ImportError::new("E4001", format!("unsupported mode: {mode}"))
                .with_section("General")
                .with_key("Mode"),
        );
    }

    match layout_from_document(doc) {
        Ok(layout) => chart.layout = Some(layout),
        Err(e) => {
            chart.layout = None;
            return Err(e);
        }
    }

    let existing = song.charts.len();
    chart.meter = existing as u32;
    chart.difficulty = Difficulty::from_index(existing);
    chart.tidy_up();
    chart.saved_to_disk = true;
    Ok(())
}
