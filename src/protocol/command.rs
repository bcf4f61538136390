//! Color command grammars
//!
//! Two wire grammars exist and are kept apart:
//!
//! - hex triplet: `RRGGBB`, six hex digits, framed by digit count
//! - structured line: `RGB:r,g,b`, decimal, framed by `\n` / `\r`
//!
//! Failures never reach the host; the caller drops them and the LED keeps
//! its current color.

use super::assembler::{CompletedLine, Framing};
use crate::config::HEX_TOKEN_DIGITS;
use crate::types::{Grammar, LedColor};

/// Literal prefix of a structured line
pub const RGB_PREFIX: &[u8] = b"RGB:";

/// Why a command was discarded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Line does not start with `RGB:`
    MissingPrefix,
    /// Fewer than three integers could be scanned
    MissingField {
        /// Index (0 = red) of the first field that failed
        index: u8,
    },
    /// Hex token has the wrong number of digits
    WrongLength(usize),
    /// Hex token contains a non-hex character
    InvalidHex,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ParseError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::MissingPrefix => defmt::write!(f, "missing RGB: prefix"),
            Self::MissingField { index } => defmt::write!(f, "missing field {}", index),
            Self::WrongLength(len) => defmt::write!(f, "wrong token length {}", len),
            Self::InvalidHex => defmt::write!(f, "invalid hex digit"),
        }
    }
}

impl Grammar {
    /// Framing the assembler must apply for this grammar
    #[must_use]
    pub const fn framing(self) -> Framing {
        match self {
            Self::HexTriplet => Framing::HexToken,
            Self::RgbLine => Framing::Line,
        }
    }
}

/// Color command parser for one grammar
#[derive(Clone, Copy, Debug)]
pub struct CommandParser {
    grammar: Grammar,
}

impl CommandParser {
    /// Create a parser for a grammar
    #[must_use]
    pub const fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    /// Active grammar
    #[must_use]
    pub const fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// Parse one completed command
    pub fn parse(&self, line: &CompletedLine) -> Result<LedColor, ParseError> {
        self.parse_bytes(line.as_bytes())
    }

    /// Parse raw command bytes (no terminator)
    pub fn parse_bytes(&self, line: &[u8]) -> Result<LedColor, ParseError> {
        match self.grammar {
            Grammar::HexTriplet => parse_hex_triplet(line),
            Grammar::RgbLine => parse_rgb_line(line),
        }
    }
}

/// Parse `RRGGBB`
pub fn parse_hex_triplet(token: &[u8]) -> Result<LedColor, ParseError> {
    if token.len() != HEX_TOKEN_DIGITS {
        return Err(ParseError::WrongLength(token.len()));
    }

    let packed = token.iter().try_fold(0u32, |acc, &c| {
        let digit = char::from(c).to_digit(16).ok_or(ParseError::InvalidHex)?;
        Ok((acc << 4) | digit)
    })?;

    Ok(LedColor::from_packed(packed))
}

/// Parse `RGB:r,g,b`
///
/// Each field is scanned like C's `%d`: optional leading whitespace, an
/// optional sign, then at least one digit. Fields are separated by a bare
/// comma and anything after the third field is ignored. Values saturate
/// into 0..=255.
pub fn parse_rgb_line(line: &[u8]) -> Result<LedColor, ParseError> {
    let rest = line.strip_prefix(RGB_PREFIX).ok_or(ParseError::MissingPrefix)?;

    let mut scanner = Scanner::new(rest);
    let mut fields = [0i32; 3];
    for (index, field) in (0u8..).zip(fields.iter_mut()) {
        if index > 0 && !scanner.expect(b',') {
            return Err(ParseError::MissingField { index });
        }
        *field = scanner.int().ok_or(ParseError::MissingField { index })?;
    }

    Ok(LedColor::saturating(fields[0], fields[1], fields[2]))
}

/// Cursor over the bytes after the prefix
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn expect(&mut self, literal: u8) -> bool {
        if self.peek() == Some(literal) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn int(&mut self) -> Option<i32> {
        while self.peek().is_some_and(is_c_space) {
            self.pos += 1;
        }

        let negative = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        let start = self.pos;
        let mut value: i32 = 0;
        while let Some(c) = self.peek().filter(u8::is_ascii_digit) {
            value = value.saturating_mul(10).saturating_add(i32::from(c - b'0'));
            self.pos += 1;
        }

        if self.pos == start {
            return None;
        }
        Some(if negative { value.saturating_neg() } else { value })
    }
}

/// `isspace` in the C locale
const fn is_c_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}
