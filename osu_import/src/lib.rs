//! Converts osu!mania beatmaps into row-indexed songs and charts.
//!
//! The pipeline is text -> [`ParsedDocument`] -> tempo timeline -> note data.
//! Each stage only reads what earlier stages produced, except that note
//! conversion anchors the song timeline's beat-zero offset at the earliest
//! hit object.
//!
//! Charts of one song share its [`song_schema::TimingData`] and must be
//! converted one after another.

mod classify;
mod document;
mod error;
mod fields;
mod loader;
mod metadata;
mod notes;
mod timing;
mod tokenizer;

pub use classify::{classify_and_prepare_chart, MANIA_MODE};
pub use document::{build_document, parse_document, ParsedDocument, Section, SECTION_COUNT};
pub use error::{ImportError, ImportErrorKind};
pub use loader::{
    applicable_files, decode_text, import_chart_str, import_document, load_note_data_from_file,
    load_song_from_dir,
};
pub use metadata::set_metadata;
pub use notes::{lane_index, parse_hit_events, populate_note_data, HitKind, RawHitEvent, PLAYFIELD_WIDTH};
pub use timing::{ms_to_row, parse_tempo_points, resolve_bpms, set_timing_data, TempoChangePoint};
pub use tokenizer::{tokenize, RawSection};

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// File extension of candidate beatmaps, without the dot.
    pub extension: String,
    /// Required `General.Mode` value.
    pub mania_mode: i64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            extension: "osu".to_string(),
            mania_mode: MANIA_MODE,
        }
    }
}

#[cfg(test)]
mod tests;
