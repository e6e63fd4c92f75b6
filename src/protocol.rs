//! The chunked-read wire format.
//!
//! Requests are `<offset>,<count>\n` in ASCII. A response is the requested
//! words joined by commas, with a trailing `EOF` element once the slice
//! reaches the end of the store, all terminated by `\n`. Bad requests are
//! answered with `ERROR: <reason>\n`.

use crate::prelude::*;
use crate::store::Chunk;

pub const EOF_TOKEN: &str = "EOF";
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Longest request line accepted before the line is rejected unread.
pub const MAX_LINE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub offset: i64,
    pub count: i64,
}

fn trim(mut s: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = s {
        if !first.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    while let [rest @ .., last] = s {
        if !last.is_ascii_whitespace() {
            break;
        }
        s = rest;
    }
    s
}

/// A decimal integer with an optional leading minus sign.
fn int(s: &[u8]) -> Option<i64> {
    let (negative, digits) = match trim(s) {
        [b'-', digits @ ..] => (true, digits),
        digits => (false, digits),
    };
    if digits.is_empty() {
        return None;
    }
    let mut n: i64 = 0;
    for &d in digits {
        if !d.is_ascii_digit() {
            return None;
        }
        let d = i64::from(d - b'0');
        n = n.checked_mul(10)?;
        n = if negative { n.checked_sub(d)? } else { n.checked_add(d)? };
    }
    Some(n)
}

/// Parses one request line, without its `\n`. Blank lines yield `None`.
///
/// A line that fits the two-integer grammar but names a negative offset or
/// a count below one fails with [`Error::InvalidRequest`].
pub fn parse_request(line: &[u8]) -> Result<Option<Range>> {
    let line = trim(line);
    if line.is_empty() {
        return Ok(None);
    }
    let comma = line.iter().position(|&b| b == b',').ok_or(Error::Protocol)?;
    let offset = int(&line[..comma]).ok_or(Error::Protocol)?;
    let count = int(&line[comma + 1..]).ok_or(Error::Protocol)?;
    if offset < 0 || count <= 0 {
        return Err(Error::InvalidRequest { offset, count });
    }
    Ok(Some(Range { offset, count }))
}

pub fn encode_request(range: Range, out: &mut Vec<u8>) {
    out.extend_from_slice(format!("{},{}\n", range.offset, range.count).as_bytes());
}

pub fn encode_chunk(chunk: &Chunk, out: &mut Vec<u8>) {
    let mut tokens = chunk.words.iter().map(String::as_str);
    if let Some(first) = tokens.next() {
        out.extend_from_slice(first.as_bytes());
        for word in tokens {
            out.push(b',');
            out.extend_from_slice(word.as_bytes());
        }
        if chunk.end_of_stream {
            out.push(b',');
            out.extend_from_slice(EOF_TOKEN.as_bytes());
        }
    } else if chunk.end_of_stream {
        out.extend_from_slice(EOF_TOKEN.as_bytes());
    }
    out.push(b'\n');
}

pub fn encode_error(err: &Error, out: &mut Vec<u8>) {
    out.extend_from_slice(format!("{ERROR_PREFIX}{err}\n").as_bytes());
}

/// A response line as seen by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Words { words: Vec<String>, end_of_stream: bool },
    Error(String),
}

impl Reply {
    pub fn decode(line: &str) -> Self {
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(reason) = line.strip_prefix(ERROR_PREFIX) {
            return Reply::Error(reason.to_owned());
        }
        if line == EOF_TOKEN {
            return Reply::Words { words: vec![], end_of_stream: true };
        }
        let mut words: Vec<String> = line.split(',').map(str::to_owned).collect();
        let end_of_stream = words.last().is_some_and(|w| w == EOF_TOKEN);
        if end_of_stream {
            words.pop();
        }
        Reply::Words { words, end_of_stream }
    }
}

/// Reassembles newline-terminated lines out of arbitrarily split reads.
#[derive(Debug, Default)]
pub struct LineBuffer {
    partial: Vec<u8>,
    // set after an overlong line was rejected, until its newline shows up
    discarding: bool,
}

impl LineBuffer {
    /// Feeds freshly received bytes, handing every completed line to
    /// `on_line` in the order they were terminated. An overlong line is
    /// reported once as [`Error::Protocol`].
    pub fn feed(&mut self, mut bytes: &[u8], mut on_line: impl FnMut(Result<&[u8]>)) {
        while let Some(nl) = bytes.iter().position(|&b| b == b'\n') {
            let (head, rest) = (&bytes[..nl], &bytes[nl + 1..]);
            bytes = rest;
            if self.discarding {
                self.discarding = false;
                continue;
            }
            if self.partial.len() + head.len() > MAX_LINE {
                self.partial.clear();
                on_line(Err(Error::Protocol));
            } else if self.partial.is_empty() {
                on_line(Ok(head));
            } else {
                self.partial.extend_from_slice(head);
                on_line(Ok(self.partial.as_slice()));
                self.partial.clear();
            }
        }
        if self.discarding {
            return;
        }
        self.partial.extend_from_slice(bytes);
        if self.partial.len() > MAX_LINE {
            self.partial.clear();
            self.discarding = true;
            on_line(Err(Error::Protocol));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.partial.is_empty()
    }
}
