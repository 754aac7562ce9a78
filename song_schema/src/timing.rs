use serde::{Deserialize, Serialize};

pub const ROWS_PER_BEAT: u32 = 48;
pub const DEFAULT_BPM: f64 = 120.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BpmSegment {
    pub row: u32,
    pub bpm: f64,
}

impl BpmSegment {
    pub fn new(row: u32, bpm: f64) -> Self {
        Self { row, bpm }
    }

    pub fn beat(&self) -> f64 {
        self.row as f64 / ROWS_PER_BEAT as f64
    }
}

/// Song-level tempo timeline.
///
/// `bpm_segments` is kept strictly ordered by row. `beat0_offset_seconds`
/// aligns elapsed song time with row 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimingData {
    pub beat0_offset_seconds: f64,
    pub bpm_segments: Vec<BpmSegment>,
}

impl TimingData {
    pub fn is_empty(&self) -> bool {
        self.bpm_segments.is_empty()
    }

    /// Inserts a segment in row order. A segment already at that row takes the new BPM.
    pub fn add_bpm_segment(&mut self, segment: BpmSegment) {
        match self
            .bpm_segments
            .binary_search_by_key(&segment.row, |s| s.row)
        {
            Ok(idx) => self.bpm_segments[idx].bpm = segment.bpm,
            Err(idx) => self.bpm_segments.insert(idx, segment),
        }
    }

    pub fn bpm_at_row(&self, row: u32) -> Option<f64> {
        self.bpm_segments
            .iter()
            .take_while(|s| s.row <= row)
            .last()
            .or_else(|| self.bpm_segments.first())
            .map(|s| s.bpm)
    }

    /// Beat reached after `seconds` of elapsed time, measured against the given
    /// beat-zero offset rather than `self.beat0_offset_seconds`.
    ///
    /// Time before the first segment extrapolates with the first segment's tempo.
    /// Returns `None` when no segment is installed.
    pub fn beat_from_elapsed_time(&self, seconds: f64, beat0_offset_seconds: f64) -> Option<f64> {
        let time = seconds + beat0_offset_seconds;
        let mut elapsed = 0.0;

        for (i, seg) in self.bpm_segments.iter().enumerate() {
            let beats_per_second = seg.bpm / 60.0;
            let Some(next) = self.bpm_segments.get(i + 1) else {
                return Some(seg.beat() + (time - elapsed) * beats_per_second);
            };

            let seg_seconds = (next.beat() - seg.beat()) / beats_per_second;
            if time < elapsed + seg_seconds {
                return Some(seg.beat() + (time - elapsed) * beats_per_second);
            }
            elapsed += seg_seconds;
        }

        None
    }

    /// Elapsed seconds at which `beat` is reached, relative to the stored offset.
    pub fn elapsed_time_from_beat(&self, beat: f64) -> Option<f64> {
        let mut elapsed = 0.0;

        for (i, seg) in self.bpm_segments.iter().enumerate() {
            let seconds_per_beat = 60.0 / seg.bpm;
            let reached_end = match self.bpm_segments.get(i + 1) {
                Some(next) if beat >= next.beat() => {
                    elapsed += (next.beat() - seg.beat()) * seconds_per_beat;
                    false
                }
                _ => true,
            };
            if reached_end {
                return Some(elapsed + (beat - seg.beat()) * seconds_per_beat - self.beat0_offset_seconds);
            }
        }

        None
    }
}
