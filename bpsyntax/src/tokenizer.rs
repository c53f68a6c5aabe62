//! Module `tokenizer` splits a raw operator line into bracket groups.
//!
//! Each group becomes one `Instruction` holding slices of the original line,
//! so nothing is copied until the compiler classifies the tokens:
//!
//! ```rust
//! use bpsyntax::tokenizer::{tokenize, Prefix};
//!
//! let instrs = tokenize("[0xA0] ignored [0x01 r:8]");
//! assert_eq!(instrs.len(), 2);
//! assert_eq!(instrs[1].prefix, Prefix::Bracket);
//! assert_eq!(instrs[1].tokens, vec!["0x01", "r:8"]);
//! ```

use alloc::vec::Vec;

/// `Prefix` records which character opened a bracket group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// `[`: the compiled group is framed by an implicit Start and Stop.
    Bracket,
    /// `{`
    Brace,
    /// `>`
    Arrow,
}

impl Prefix {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '[' => Some(Prefix::Bracket),
            '{' => Some(Prefix::Brace),
            '>' => Some(Prefix::Arrow),
            _ => None,
        }
    }

    fn closed_by(self, c: char) -> bool {
        match c {
            ']' => true,
            '}' => self == Prefix::Brace,
            _ => false,
        }
    }
}

/// `Instruction` is one bracket group of an operator line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// The group's text, from its opening character through its closing one.
    pub raw: &'a str,
    pub prefix: Prefix,
    pub tokens: Vec<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InBracket,
    InCharLiteral,
    InStringLiteral,
}

/// `tokenize` returns the complete bracket groups of `line` in source order.
///
/// Text outside any group is ignored. A group still open when the line
/// ends is dropped, except for a `>` group, which runs until a closing
/// bracket, the next opening character or the end of the line.
pub fn tokenize(line: &str) -> Vec<Instruction<'_>> {
    Tokenizer::new(line).run()
}

struct Tokenizer<'a> {
    line: &'a str,
    state: State,
    out: Vec<Instruction<'a>>,
    /// Byte offset and prefix of the group under construction.
    group: Option<(usize, Prefix)>,
    tokens: Vec<&'a str>,
    /// Byte offset of the token under construction.
    token_start: Option<usize>,
}

impl<'a> Tokenizer<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            line,
            state: State::Normal,
            out: Vec::new(),
            group: None,
            tokens: Vec::new(),
            token_start: None,
        }
    }

    fn run(mut self) -> Vec<Instruction<'a>> {
        for (i, c) in self.line.char_indices() {
            match self.state {
                State::Normal => {
                    if let Some(prefix) = Prefix::from_char(c) {
                        self.open(i, prefix);
                    }
                }
                State::InBracket => self.bracket_char(i, c),
                State::InCharLiteral => {
                    if c == '\'' {
                        self.close_literal(i + c.len_utf8());
                    }
                }
                State::InStringLiteral => {
                    if c == '"' {
                        self.close_literal(i + c.len_utf8());
                    }
                }
            }
        }

        match (self.state, self.group) {
            (State::InBracket, Some((_, Prefix::Arrow))) => {
                let end = self.line.len();
                self.finish_arrow(end);
            }
            (State::Normal, _) => {}
            (_, Some((start, _))) => {
                log::trace!("dropping unterminated group {:?}", &self.line[start..]);
            }
            _ => {}
        }

        self.out
    }

    fn bracket_char(&mut self, i: usize, c: char) {
        let prefix = match self.group {
            Some((_, prefix)) => prefix,
            None => return,
        };

        match c {
            '\'' | '"' => {
                self.flush(i);
                self.token_start = Some(i);
                self.state = if c == '\'' {
                    State::InCharLiteral
                } else {
                    State::InStringLiteral
                };
            }
            c if prefix.closed_by(c) => {
                self.flush(i);
                self.finish(i + c.len_utf8());
            }
            c if c.is_whitespace() => self.flush(i),
            c => match Prefix::from_char(c) {
                Some(next) => {
                    match self.group {
                        // A `>` group has no closer, so the next opener ends it.
                        Some((_, Prefix::Arrow)) => self.finish_arrow(i),
                        Some((start, _)) => {
                            log::trace!("dropping group {:?} reopened", &self.line[start..i]);
                        }
                        None => {}
                    }
                    self.open(i, next);
                }
                None => {
                    if self.token_start.is_none() {
                        self.token_start = Some(i);
                    }
                }
            },
        }
    }

    fn open(&mut self, at: usize, prefix: Prefix) {
        self.group = Some((at, prefix));
        self.tokens.clear();
        self.token_start = None;
        self.state = State::InBracket;
    }

    /// `flush` ends the token under construction, if any, at byte `end`.
    fn flush(&mut self, end: usize) {
        if let Some(start) = self.token_start.take() {
            self.tokens.push(&self.line[start..end]);
        }
    }

    fn close_literal(&mut self, end: usize) {
        self.flush(end);
        self.state = State::InBracket;
    }

    /// `finish_arrow` completes a `>` group at byte `end`, leaving any
    /// trailing whitespace out of its raw text.
    fn finish_arrow(&mut self, end: usize) {
        self.flush(end);
        let end = match self.group {
            Some((start, _)) => start + self.line[start..end].trim_end().len(),
            None => end,
        };
        self.finish(end);
    }

    fn finish(&mut self, end: usize) {
        if let Some((start, prefix)) = self.group.take() {
            self.out.push(Instruction {
                raw: &self.line[start..end],
                prefix,
                tokens: core::mem::take(&mut self.tokens),
            });
        }
        self.state = State::Normal;
    }
}
