//! Splits beatmap text into bracketed sections and their raw content lines.
//!
//! The scanner is a small state machine over characters with one character of
//! lookback. `\r` is invisible to it. `//` starts a comment that runs to the
//! end of the line, whatever region it appears in.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    /// Before the first section header.
    Preamble,
    Tag,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scan(Region),
    /// A single `/` was read; the next character decides whether it opens a comment.
    Slash(Region),
    Comment(Region),
}

pub fn tokenize(src: &str) -> Vec<RawSection> {
    let mut tokenizer = Tokenizer::new();
    for ch in src.chars() {
        tokenizer.step(ch);
    }
    tokenizer.finish()
}

struct Tokenizer {
    state: State,
    last: Option<char>,
    tag: String,
    content: String,
    sections: Vec<RawSection>,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            state: State::Scan(Region::Preamble),
            last: None,
            tag: String::new(),
            content: String::new(),
            sections: Vec::new(),
        }
    }

    fn step(&mut self, ch: char) {
        if ch == '\r' {
            return;
        }

        let state = self.state;
        self.state = match state {
            State::Scan(region) => self.scan(region, ch),
            State::Slash(region) => self.slash(region, ch),
            State::Comment(region) => self.comment(region, ch),
        };
        self.last = Some(ch);
    }

    fn scan(&mut self, region: Region, ch: char) -> State {
        if ch == '/' {
            return State::Slash(region);
        }
        match region {
            Region::Preamble => self.preamble(ch),
            Region::Tag => self.tag(ch),
            Region::Content => self.content(ch),
        }
    }

    fn slash(&mut self, region: Region, ch: char) -> State {
        if ch == '/' {
            return State::Comment(region);
        }
        self.literal(region, '/');
        self.scan(region, ch)
    }

    fn comment(&mut self, region: Region, ch: char) -> State {
        if ch != '\n' {
            return State::Comment(region);
        }
        if region == Region::Content {
            self.close_line();
        }
        State::Scan(region)
    }

    fn preamble(&mut self, ch: char) -> State {
        if ch == '[' {
            self.tag.clear();
            return State::Scan(Region::Tag);
        }
        State::Scan(Region::Preamble)
    }

    fn tag(&mut self, ch: char) -> State {
        if ch == ']' {
            self.sections.push(RawSection {
                name: std::mem::take(&mut self.tag),
                lines: Vec::new(),
            });
            self.content.clear();
            return State::Scan(Region::Content);
        }
        self.tag.push(ch);
        State::Scan(Region::Tag)
    }

    fn content(&mut self, ch: char) -> State {
        if ch == '[' && self.last == Some('\n') {
            self.close_line();
            self.tag.clear();
            return State::Scan(Region::Tag);
        }
        if ch == '\n' {
            self.close_line();
        } else {
            self.content.push(ch);
        }
        State::Scan(Region::Content)
    }

    /// A `/` that turned out not to open a comment.
    fn literal(&mut self, region: Region, ch: char) {
        match region {
            Region::Preamble => {}
            Region::Tag => self.tag.push(ch),
            Region::Content => self.content.push(ch),
        }
    }

    fn close_line(&mut self) {
        let line = std::mem::take(&mut self.content);
        if let Some(section) = self.sections.last_mut() {
            section.lines.push(line);
        }
    }

    fn finish(mut self) -> Vec<RawSection> {
        let state = self.state;
        let region = match state {
            State::Scan(region) | State::Comment(region) => region,
            State::Slash(region) => {
                self.literal(region, '/');
                region
            }
        };

        // A trailing newline has already closed the last line.
        if region == Region::Content && (self.last != Some('\n') || !self.content.is_empty()) {
            self.close_line();
        }
        self.sections
    }
}
