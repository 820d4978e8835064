//! Edit grammar scanner.
//!
//! Backend output is scanned line by line for blocks of the shape
//!
//! ~~~text
//! **FILE: src/lib.rs:42**
//! ```
//! OLD:
//! <verbatim old lines>
//! NEW:
//! <verbatim new lines>
//! ```
//! ~~~
//!
//! Anything that does not complete this shape is skipped. Scanning is a single forward pass,
//! so worst-case time is linear in the input regardless of how many fences are left open.

use crate::types::{Edit, LineRange};

const HEADER_OPEN: &str = "**FILE:";
const HEADER_CLOSE: &str = "**";
const OLD_MARKER: &str = "OLD:";
const NEW_MARKER: &str = "NEW:";

/// Extract every well-formed edit block from `text`, in source order.
///
/// Never fails: malformed or unterminated blocks contribute nothing.
#[must_use]
pub fn parse_edits(text: &str) -> Vec<Edit> {
    let mut scanner = Scanner::default();
    for line in text.lines() {
        scanner.feed(line);
    }
    if !matches!(scanner.state, State::SeekingHeader) {
        log::debug!("Dropping unterminated edit block at end of input");
    }
    scanner.edits
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Header {
    file: String,
    line: Option<usize>,
}

#[derive(Debug, Default)]
enum State<'a> {
    #[default]
    SeekingHeader,
    ExpectFence(Header),
    ExpectOld(Header),
    InOld {
        header: Header,
        old: Vec<&'a str>,
    },
    InNew {
        header: Header,
        old: Vec<&'a str>,
        new: Vec<&'a str>,
    },
}

#[derive(Default)]
struct Scanner<'a> {
    state: State<'a>,
    edits: Vec<Edit>,
}

impl<'a> Scanner<'a> {
    fn feed(&mut self, line: &'a str) {
        // A line is re-examined at most once, always from `SeekingHeader`.
        while !self.step(line) {}
    }

    /// Advance the state machine; returns `false` when `line` must be re-examined.
    fn step(&mut self, line: &'a str) -> bool {
        match std::mem::take(&mut self.state) {
            State::SeekingHeader => {
                if let Some(header) = parse_header(line) {
                    self.state = State::ExpectFence(header);
                }
                true
            }
            State::ExpectFence(header) => {
                if is_blank(line) {
                    self.state = State::ExpectFence(header);
                    true
                } else if is_opening_fence(line) {
                    self.state = State::ExpectOld(header);
                    true
                } else {
                    false
                }
            }
            State::ExpectOld(header) => {
                if is_blank(line) {
                    self.state = State::ExpectOld(header);
                    true
                } else if line.trim_end() == OLD_MARKER {
                    self.state = State::InOld {
                        header,
                        old: Vec::new(),
                    };
                    true
                } else {
                    false
                }
            }
            State::InOld { header, mut old } => {
                if line.trim_end() == NEW_MARKER {
                    self.state = State::InNew {
                        header,
                        old,
                        new: Vec::new(),
                    };
                    true
                } else if is_closing_fence(line) {
                    log::debug!("Edit block for '{}' closed before NEW:", header.file);
                    true
                } else if parse_header(line).is_some() {
                    false
                } else {
                    old.push(line);
                    self.state = State::InOld { header, old };
                    true
                }
            }
            State::InNew {
                header,
                old,
                mut new,
            } => {
                if closes_new_block(line) {
                    self.edits.push(build_edit(header, &old, &new));
                    true
                } else if parse_header(line).is_some() {
                    log::debug!("Edit block for '{}' never closed", header.file);
                    false
                } else {
                    new.push(line);
                    self.state = State::InNew { header, old, new };
                    true
                }
            }
        }
    }
}

fn build_edit(header: Header, old: &[&str], new: &[&str]) -> Edit {
    let old = trim_blank_lines(old);
    let new = trim_blank_lines(new);
    let mut edit = Edit::new(header.file, old.join("\n"), new.join("\n"));
    if let Some(start) = header.line {
        edit = edit.with_ranges(
            LineRange::spanning(start, old.len()),
            LineRange::spanning(start, new.len()),
        );
    }
    edit
}

/// Parse `**FILE: <file>:<line>**`, tolerating leading text such as list bullets.
///
/// The `:<line>` suffix is optional; without it the edit carries no ranges.
fn parse_header(line: &str) -> Option<Header> {
    let start = line.find(HEADER_OPEN)?;
    let rest = line[start + HEADER_OPEN.len()..].trim_end();
    let inner = rest.strip_suffix(HEADER_CLOSE)?.trim();
    if inner.is_empty() {
        return None;
    }

    if let Some((file, digits)) = inner.rsplit_once(':') {
        let digits = digits.trim();
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            // A line number too large to represent is dropped, not the block.
            return Some(Header {
                file: file.trim().to_string(),
                line: digits.parse::<usize>().ok(),
            });
        }
    }

    Some(Header {
        file: inner.to_string(),
        line: None,
    })
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Two or more backticks, optionally followed by an info string such as `rust`.
fn is_opening_fence(line: &str) -> bool {
    let trimmed = line.trim();
    let info = trimmed.trim_start_matches('`');
    trimmed.len() - info.len() >= 2 && !info.contains(char::is_whitespace)
}

/// A bare run of three or more backticks.
fn is_closing_fence(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'`')
}

/// Any line starting with three backticks ends the NEW section, info string or not.
fn closes_new_block(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn trim_blank_lines<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let Some(first) = lines.iter().position(|l| !is_blank(l)) else {
        return Vec::new();
    };
    let last = lines.iter().rposition(|l| !is_blank(l)).unwrap_or(first);
    lines[first..=last].to_vec()
}
