use std::collections::HashMap;

use crate::tokenizer::{tokenize, RawSection};

/// Number of sections a beatmap file must have to be accepted.
pub const SECTION_COUNT: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Raw content lines in file order, including the header-line remainder.
    pub lines: Vec<String>,
    pub entries: HashMap<String, String>,
}

/// Two-level `section -> key -> value` view of a beatmap file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    sections: HashMap<String, Section>,
}

impl ParsedDocument {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .entries
            .get(key)
            .map(String::as_str)
    }

    pub fn lines(&self, section: &str) -> &[String] {
        self.sections
            .get(section)
            .map(|s| s.lines.as_slice())
            .unwrap_or(&[])
    }
}

pub fn parse_document(src: &str) -> ParsedDocument {
    build_document(tokenize(src))
}

/// Anything other than exactly [`SECTION_COUNT`] sections yields an empty document.
pub fn build_document(raw: Vec<RawSection>) -> ParsedDocument {
    if raw.len() != SECTION_COUNT {
        return ParsedDocument::default();
    }

    let mut sections: HashMap<String, Section> = HashMap::new();
    for RawSection { name, lines } in raw {
        let section = sections.entry(name).or_default();
        for line in lines {
            let (key, value) = split_entry(&line);
            section.entries.insert(key.to_string(), value.to_string());
            section.lines.push(line);
        }
    }

    ParsedDocument { sections }
}

fn split_entry(line: &str) -> (&str, &str) {
    line.split_once(':').unwrap_or((line, ""))
}
