use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TapRole {
    OriginalTap,
    OriginalLift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldRole {
    OriginalHoldHead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapEvent {
    pub lane: u8,
    pub row: u32,
    pub role: TapRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldEvent {
    pub lane: u8,
    pub start_row: u32,
    pub end_row: u32,
    pub role: HoldRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TapNote {
    #[serde(rename = "tap")]
    Tap { role: TapRole },

    #[serde(rename = "hold")]
    HoldHead { end_row: u32, role: HoldRole },
}

/// Per-lane notes keyed by row. One note occupies a `(lane, row)` cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteData {
    tracks: Vec<BTreeMap<u32, TapNote>>,
}

impl NoteData {
    pub fn new(num_tracks: usize) -> Self {
        Self {
            tracks: vec![BTreeMap::new(); num_tracks],
        }
    }

    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.iter().all(BTreeMap::is_empty)
    }

    pub fn track(&self, lane: u8) -> Option<&BTreeMap<u32, TapNote>> {
        self.tracks.get(lane as usize)
    }

    /// Writes a tap, replacing whatever occupied the cell. Lanes outside the
    /// track range are ignored.
    pub fn set_tap(&mut self, tap: TapEvent) {
        let Some(track) = self.tracks.get_mut(tap.lane as usize) else {
            return;
        };
        track.insert(tap.row, TapNote::Tap { role: tap.role });
    }

    /// Adds a hold over `[start_row, end_row]`. Taps inside the range are
    /// dropped and overlapping holds on the same lane are merged into one.
    pub fn add_hold(&mut self, hold: HoldEvent) {
        let Some(track) = self.tracks.get_mut(hold.lane as usize) else {
            return;
        };

        let mut start = hold.start_row;
        let mut end = hold.end_row.max(hold.start_row);

        let covered: Vec<u32> = track
            .range(..=end)
            .filter(|&(&row, note)| match note {
                TapNote::Tap { .. } => row >= start,
                TapNote::HoldHead { end_row, .. } => *end_row >= start,
            })
            .map(|(&row, _)| row)
            .collect();

        for row in covered {
            if let Some(TapNote::HoldHead { end_row, .. }) = track.remove(&row) {
                start = start.min(row);
                end = end.max(end_row);
            }
        }

        track.insert(
            start,
            TapNote::HoldHead {
                end_row: end,
                role: hold.role,
            },
        );
    }

    pub fn taps(&self) -> impl Iterator<Item = TapEvent> + '_ {
        self.cells().filter_map(|(lane, row, note)| match note {
            TapNote::Tap { role } => Some(TapEvent { lane, row, role }),
            TapNote::HoldHead { .. } => None,
        })
    }

    pub fn holds(&self) -> impl Iterator<Item = HoldEvent> + '_ {
        self.cells().filter_map(|(lane, row, note)| match note {
            TapNote::HoldHead { end_row, role } => Some(HoldEvent {
                lane,
                start_row: row,
                end_row,
                role,
            }),
            TapNote::Tap { .. } => None,
        })
    }

    /// Last row touched by any note, hold tails included.
    pub fn last_row(&self) -> Option<u32> {
        self.cells()
            .map(|(_, row, note)| match note {
                TapNote::Tap { .. } => row,
                TapNote::HoldHead { end_row, .. } => end_row,
            })
            .max()
    }

    fn cells(&self) -> impl Iterator<Item = (u8, u32, TapNote)> + '_ {
        self.tracks.iter().enumerate().flat_map(|(lane, track)| {
            track
                .iter()
                .map(move |(&row, &note)| (lane as u8, row, note))
        })
    }
}
