//! Line-oriented tokenizer shared by every navigation data parser.
//!
//! X-Plane data files are plain text where each line is a small ordered
//! stream of whitespace-separated tokens. [`RowTokenizer`] reads one line at a
//! time and hands out typed tokens from it; it knows nothing about what a row
//! means. Conversion failures surface as [`Error::MalformedToken`] carrying
//! the 1-based line number, which is the only place malformed input errors
//! originate.

use std::io::BufRead;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{Error, Result, TokenKind};

/// Byte-order markers found on the first line of X-Plane data files.
const BYTE_ORDER_MARKERS: [&str; 2] = ["I", "A"];

/// Streaming tokenizer over a buffered text source.
#[derive(Debug)]
pub struct RowTokenizer<R> {
    reader: R,
    raw: Vec<u8>,
    line: String,
    cursor: usize,
    line_number: usize,
}

impl<R: BufRead> RowTokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            raw: Vec::new(),
            line: String::new(),
            cursor: 0,
            line_number: 0,
        }
    }

    /// 1-based number of the line currently being tokenized.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the file header, skipping the `I`/`A` byte-order line if present.
    pub fn parse_header(&mut self) -> Result<String> {
        if !self.next_line()? {
            return Err(Error::MissingHeader);
        }

        if BYTE_ORDER_MARKERS.contains(&self.line.trim()) && !self.next_line()? {
            return Err(Error::MissingHeader);
        }

        let header = self.line.trim().to_string();
        self.cursor = self.line.len();
        Ok(header)
    }

    /// Advance to the next non-empty line. Returns `false` at end of input.
    pub fn next_line(&mut self) -> Result<bool> {
        while self.read_raw_line()? {
            if !self.line.trim().is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Invoke `handler` once per remaining non-empty line, in order.
    ///
    /// The first error returned by the handler stops the scan and is
    /// propagated unchanged.
    pub fn each_line<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<()>,
    {
        while self.next_line()? {
            handler(self)?;
        }
        Ok(())
    }

    pub fn parse_int(&mut self) -> Result<i32> {
        self.parse_token(TokenKind::Integer)
    }

    pub fn parse_double(&mut self) -> Result<f64> {
        self.parse_token(TokenKind::Double)
    }

    /// Consume the next token as a word. Fails when the line is exhausted.
    pub fn parse_word(&mut self) -> Result<String> {
        let line = self.line_number;
        self.next_word().ok_or(Error::MalformedToken {
            line,
            expected: TokenKind::Word,
            found: None,
        })
    }

    /// Consume the next token, or `None` when the line is exhausted.
    pub fn next_word(&mut self) -> Option<String> {
        let span = self.find_token()?;
        self.cursor = span.end;
        Some(self.line[span].to_string())
    }

    /// Look at the next token without consuming it.
    pub fn peek_word(&self) -> Option<&str> {
        self.find_token().map(|span| &self.line[span])
    }

    /// Consume text up to `delimiter` (exclusive), trimmed.
    ///
    /// The delimiter itself is consumed too. When it does not occur again the
    /// remainder of the line is returned, which is empty on an exhausted line.
    pub fn parse_field(&mut self, delimiter: char) -> String {
        let rest = &self.line[self.cursor..];
        match rest.find(delimiter) {
            Some(offset) => {
                let field = rest[..offset].trim().to_string();
                self.cursor += offset + delimiter.len_utf8();
                field
            }
            None => {
                let field = rest.trim().to_string();
                self.cursor = self.line.len();
                field
            }
        }
    }

    /// Everything left on the current line with leading whitespace removed.
    pub fn rest_of_line(&mut self) -> String {
        let rest = self.line[self.cursor..].trim_start().to_string();
        self.cursor = self.line.len();
        rest
    }

    fn parse_token<T: FromStr>(&mut self, expected: TokenKind) -> Result<T> {
        let line = self.line_number;
        let Some(span) = self.find_token() else {
            return Err(Error::MalformedToken {
                line,
                expected,
                found: None,
            });
        };
        self.cursor = span.end;

        let token = &self.line[span];
        token.parse().map_err(|_| Error::MalformedToken {
            line,
            expected,
            found: Some(token.to_string()),
        })
    }

    fn find_token(&self) -> Option<Range<usize>> {
        let rest = &self.line[self.cursor..];
        let skipped = rest.len() - rest.trim_start().len();
        let start = self.cursor + skipped;
        if start >= self.line.len() {
            return None;
        }

        let len = self.line[start..]
            .find(char::is_whitespace)
            .unwrap_or(self.line.len() - start);
        Some(start..start + len)
    }

    fn read_raw_line(&mut self) -> Result<bool> {
        self.line.clear();
        self.raw.clear();
        self.cursor = 0;
        if self.reader.read_until(b'\n', &mut self.raw)? == 0 {
            return Ok(false);
        }
        self.line_number += 1;

        // Free-text fields are not always UTF-8 (Latin-1 names occur).
        self.line.push_str(&String::from_utf8_lossy(&self.raw));
        let content_len = self.line.trim_end_matches(['\n', '\r']).len();
        self.line.truncate(content_len);
        Ok(true)
    }
}
