use song_schema::{Chart, ChartLayout, HoldEvent, HoldRole, NoteData, TapEvent, TapRole, TimingData};
use tracing::debug;

use crate::{
    classify::layout_from_document,
    document::ParsedDocument,
    fields::records,
    timing::ms_to_row,
    ImportError,
};

/// Horizontal resolution of hit-object positions.
pub const PLAYFIELD_WIDTH: i64 = 512;

const HOLD_TYPE: i64 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Tap,
    HoldStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHitEvent {
    /// Horizontal position, `0..PLAYFIELD_WIDTH`.
    pub lane: i64,
    pub offset_ms: i64,
    pub kind: HitKind,
    pub hold_end_ms: Option<i64>,
}

impl RawHitEvent {
    fn end_ms(&self) -> i64 {
        self.hold_end_ms.unwrap_or(self.offset_ms)
    }
}

/// Parses `HitObjects` records. Records that are neither holds (type 128)
/// nor taps (type bit 0) are skipped.
pub fn parse_hit_events(doc: &ParsedDocument) -> Result<Vec<RawHitEvent>, ImportError> {
    let mut events = Vec::new();
    for record in records(doc, "HitObjects") {
        let type_mask = record.int(3)?;
        let kind = if type_mask == HOLD_TYPE {
            HitKind::HoldStart
        } else if type_mask & 1 == 1 {
            HitKind::Tap
        } else {
            continue;
        };

        events.push(RawHitEvent {
            lane: record.int(0)?,
            offset_ms: record.int(2)?,
            kind,
            hold_end_ms: match kind {
                HitKind::HoldStart => Some(record.int(5)?),
                HitKind::Tap => None,
            },
        });
    }
    Ok(events)
}

fn since_first(offset_ms: i64, first_ms: i64) -> Result<i64, ImportError> {
    offset_ms.checked_sub(first_ms).ok_or_else(|| {
        ImportError::new(
            "E3001",
            format!("{offset_ms}ms is out of range relative to {first_ms}ms"),
        )
        .with_section("HitObjects")
    })
}

pub fn lane_index(raw_lane: i64, layout: ChartLayout) -> u8 {
    let lanes = layout.lane_count() as i64;
    let index = raw_lane.clamp(0, PLAYFIELD_WIDTH - 1) / (PLAYFIELD_WIDTH / lanes);
    index.min(lanes - 1) as u8
}

/// Converts the hit objects into the chart's note data, anchoring the earliest
/// event at row 0.
///
/// Sets `timing.beat0_offset_seconds` so that the earliest event's time lines
/// up with beat zero. The tempo segments must already be installed.
pub fn populate_note_data(
    doc: &ParsedDocument,
    timing: &mut TimingData,
    chart: &mut Chart,
) -> Result<(), ImportError> {
    let layout = match chart.layout {
        Some(layout) => layout,
        None => layout_from_document(doc)?,
    };
    let mut note_data = NoteData::new(layout.lane_count() as usize);

    let (mut taps, mut holds): (Vec<RawHitEvent>, Vec<RawHitEvent>) = parse_hit_events(doc)?
        .into_iter()
        .partition(|e| e.kind == HitKind::Tap);
    taps.sort_by_key(|e| e.offset_ms);
    holds.sort_by_key(|e| e.offset_ms);

    let first_ms = taps.first().into_iter().chain(holds.first()).map(|e| e.offset_ms).min();
    let Some(first_ms) = first_ms else {
        chart.set_note_data(note_data);
        return Ok(());
    };
    if timing.is_empty() {
        return Err(ImportError::new("E5001", "no tempo segments installed"));
    }
    let last_ms = taps.iter().chain(&holds).map(RawHitEvent::end_ms).max().unwrap_or(first_ms);

    timing.beat0_offset_seconds = -(first_ms as f64) / 1000.0;

    for tap in &taps {
        note_data.set_tap(TapEvent {
            lane: lane_index(tap.lane, layout),
            row: ms_to_row(timing, since_first(tap.offset_ms, first_ms)?)?,
            role: TapRole::OriginalTap,
        });
    }

    for hold in &holds {
        let lane = lane_index(hold.lane, layout);
        let start_row = ms_to_row(timing, since_first(hold.offset_ms, first_ms)?)?;
        let mut end_row =
            ms_to_row(timing, since_first(hold.end_ms(), first_ms)?)?.max(start_row);
        if end_row > start_row {
            end_row -= 1;
        }
        let lift_row = end_row.checked_add(1).ok_or_else(|| {
            ImportError::new("E3001", format!("hold ending at {}ms is out of row range", hold.end_ms()))
                .with_section("HitObjects")
        })?;

        note_data.add_hold(HoldEvent {
            lane,
            start_row,
            end_row,
            role: HoldRole::OriginalHoldHead,
        });
        note_data.set_tap(TapEvent {
            lane,
            row: lift_row,
            role: TapRole::OriginalLift,
        });
    }

    debug!(
        taps = taps.len(),
        holds = holds.len(),
        first_ms,
        last_ms,
        "converted hit objects"
    );
    chart.set_note_data(note_data);
    Ok(())
}
