use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportErrorKind {
    Structure,
    Io,
    MalformedNumber,
    UnsupportedMode,
    UnsupportedLaneCount,
    Timing,
}

impl ImportErrorKind {
    pub(crate) fn from_code(code: &'static str) -> Self {
        match code {
            "E1001" => Self::Structure,
            "E2001" | "E2002" => Self::Io,
            "E3001" | "E3002" | "E3003" => Self::MalformedNumber,
            "E4001" => Self::UnsupportedMode,
            "E4002" => Self::UnsupportedLaneCount,
            "E5001" => Self::Timing,

            // unknown codes are treated as structural rejections
            _ => Self::Structure,
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct ImportError {
    pub code: &'static str,
    pub kind: ImportErrorKind,
    pub message: String,

    pub file: Option<String>,
    pub section: Option<String>,
    pub key: Option<String>,
    /// Index into the section's raw line list.
    pub line_index: Option<usize>,
}

impl ImportError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: ImportErrorKind::from_code(code),
            message: message.into(),

            file: None,
            section: None,
            key: None,
            line_index: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_line(mut self, line_index: usize) -> Self {
        self.line_index = Some(line_index);
        self
    }
}
