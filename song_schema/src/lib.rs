use serde::{Deserialize, Serialize};

mod note_data;
mod timing;

pub use note_data::{HoldEvent, HoldRole, NoteData, TapEvent, TapNote, TapRole};
pub use timing::{BpmSegment, TimingData, DEFAULT_BPM, ROWS_PER_BEAT};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Song {
    pub song_file_name: String,
    pub main_title: String,
    pub sub_title: String,
    pub artist: String,
    pub genre: String,
    pub music_file: String,
    pub music_sample_start_seconds: f64,
    pub music_sample_length_seconds: f64,
    pub display_bpm: DisplayBpm,
    pub timing: TimingData,
    pub charts: Vec<Chart>,
}

impl Song {
    pub fn create_chart(&self, filename: impl Into<String>) -> Chart {
        Chart::new(filename)
    }

    pub fn add_chart(&mut self, chart: Chart) {
        self.charts.push(chart);
    }
}

/// Tempo shown for the song; `Actual` reads it off the timing data.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisplayBpm {
    #[default]
    Actual,
}

/// Lane layout of a chart, selected from its lane count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChartLayout {
    DanceSingle,
    PumpSingle,
    DanceSolo,
    Kb7Single,
    DanceDouble,
}

impl ChartLayout {
    pub const ALL: [ChartLayout; 5] = [
        ChartLayout::DanceSingle,
        ChartLayout::PumpSingle,
        ChartLayout::DanceSolo,
        ChartLayout::Kb7Single,
        ChartLayout::DanceDouble,
    ];

    pub fn from_lane_count(lanes: i64) -> Option<Self> {
        match lanes {
            4 => Some(Self::DanceSingle),
            5 => Some(Self::PumpSingle),
            6 => Some(Self::DanceSolo),
            7 => Some(Self::Kb7Single),
            8 => Some(Self::DanceDouble),
            _ => None,
        }
    }

    pub fn lane_count(self) -> u8 {
        match self {
            Self::DanceSingle => 4,
            Self::PumpSingle => 5,
            Self::DanceSolo => 6,
            Self::Kb7Single => 7,
            Self::DanceDouble => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Easy,
    Medium,
    Hard,
    Challenge,
    Edit,
}

impl Difficulty {
    /// Tier for the `index`-th chart of a song, capped at `Edit`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Beginner,
            1 => Self::Easy,
            2 => Self::Medium,
            3 => Self::Hard,
            4 => Self::Challenge,
            _ => Self::Edit,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Chart {
    pub filename: String,
    pub layout: Option<ChartLayout>,
    pub difficulty: Difficulty,
    pub meter: u32,
    pub note_data: NoteData,
    pub finalized: bool,
    pub saved_to_disk: bool,
}

impl Chart {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn tidy_up(&mut self) {
        self.finalized = true;
    }

    pub fn set_note_data(&mut self, note_data: NoteData) {
        self.note_data = note_data;
    }
}
