use crate::{document::ParsedDocument, ImportError};

/// Leading-integer parse: skips leading whitespace, takes an optional sign and
/// digits, ignores whatever follows. `"400:0:0:0:"` is 400, `"4.0"` is 4.
pub(crate) fn parse_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let sign = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign + digits].parse().ok()
}

/// Whole-field float parse, falling back to the longest numeric prefix.
pub(crate) fn parse_float(text: &str) -> Option<f64> {
    let s = text.trim();
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }

    let candidate_len = s
        .bytes()
        .take_while(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        .count();
    (1..=candidate_len)
        .rev()
        .find_map(|n| s[..n].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub(crate) fn required_value<'a>(
    doc: &'a ParsedDocument,
    section: &str,
    key: &str,
) -> Result<&'a str, ImportError> {
    doc.value(section, key).ok_or_else(|| {
        ImportError::new("E3002", format!("missing {section}.{key}"))
            .with_section(section)
            .with_key(key)
    })
}

pub(crate) fn required_int(doc: &ParsedDocument, section: &str, key: &str) -> Result<i64, ImportError> {
    let raw = required_value(doc, section, key)?;
    parse_int(raw).ok_or_else(|| {
        ImportError::new("E3001", format!("{section}.{key} is not an integer: {raw:?}"))
            .with_section(section)
            .with_key(key)
    })
}

pub(crate) fn required_float(doc: &ParsedDocument, section: &str, key: &str) -> Result<f64, ImportError> {
    let raw = required_value(doc, section, key)?;
    parse_float(raw).ok_or_else(|| {
        ImportError::new("E3001", format!("{section}.{key} is not a number: {raw:?}"))
            .with_section(section)
            .with_key(key)
    })
}

/// Comma-separated records of a section. The first raw line (the remainder of
/// the header line) and blank lines are not records.
pub(crate) fn records<'a>(
    doc: &'a ParsedDocument,
    section: &'a str,
) -> impl Iterator<Item = Record<'a>> + 'a {
    doc.lines(section)
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(move |(line_index, line)| Record {
            section,
            line_index,
            fields: line.split(',').collect(),
        })
}

pub(crate) struct Record<'a> {
    section: &'a str,
    line_index: usize,
    fields: Vec<&'a str>,
}

impl Record<'_> {
    pub(crate) fn len(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn int(&self, idx: usize) -> Result<i64, ImportError> {
        let raw = self.field(idx)?;
        parse_int(raw).ok_or_else(|| {
            self.error("E3001", format!("field {idx} is not an integer: {raw:?}"))
        })
    }

    pub(crate) fn float(&self, idx: usize) -> Result<f64, ImportError> {
        let raw = self.field(idx)?;
        parse_float(raw)
            .ok_or_else(|| self.error("E3001", format!("field {idx} is not a number: {raw:?}")))
    }

    fn field(&self, idx: usize) -> Result<&str, ImportError> {
        self.fields.get(idx).copied().ok_or_else(|| {
            self.error(
                "E3003",
                format!("record has {} fields, needs at least {}", self.len(), idx + 1),
            )
        })
    }

    fn error(&self, code: &'static str, message: String) -> ImportError {
        ImportError::new(code, message)
            .with_section(self.section)
            .with_line(self.line_index)
    }
}
