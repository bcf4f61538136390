//! Receive line assembler
//!
//! Turns arbitrarily chunked data-out bytes into discrete commands. The
//! completed command sits in a single slot: a new completion overwrites an
//! unconsumed one, so the poll loop has to drain it every tick.

use crate::config::{HEX_TOKEN_DIGITS, RX_BUFFER_SIZE};

/// How the byte stream is cut into commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    /// Bytes up to `\n` or `\r`
    Line,
    /// A fixed run of hex digits; anything else restarts the token
    HexToken,
}

/// Marker byte that discards a partial hex token
pub const TOKEN_RESET: u8 = b'#';

/// A complete command, NUL-terminated
#[derive(Clone, PartialEq, Eq)]
pub struct CompletedLine {
    bytes: [u8; RX_BUFFER_SIZE],
    len: usize,
}

impl CompletedLine {
    const fn empty() -> Self {
        Self {
            bytes: [0; RX_BUFFER_SIZE],
            len: 0,
        }
    }

    fn fill(&mut self, content: &[u8]) {
        self.bytes[..content.len()].copy_from_slice(content);
        self.bytes[content.len()] = 0;
        self.len = content.len();
    }

    /// Command bytes without the terminator
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Command bytes including the trailing NUL
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes[..=self.len]
    }

    /// Command length without the terminator
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl core::fmt::Debug for CompletedLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match core::str::from_utf8(self.as_bytes()) {
            Ok(text) => write!(f, "CompletedLine({text:?})"),
            Err(_) => write!(f, "CompletedLine({:?})", self.as_bytes()),
        }
    }
}

/// Diagnostic counters, saturating
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Bytes dropped because the buffer was full
    pub dropped: u32,
    /// Completed commands overwritten before they were taken
    pub overwritten: u32,
    /// Partial hex tokens discarded by a reset byte
    pub resets: u32,
}

#[cfg(feature = "embedded")]
impl defmt::Format for AssemblerStats {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "dropped={} overwritten={} resets={}",
            self.dropped,
            self.overwritten,
            self.resets
        );
    }
}

/// Bounded receive buffer plus the single completed-command slot
pub struct ReceiveAssembler {
    framing: Framing,
    buffer: [u8; RX_BUFFER_SIZE],
    cursor: usize,
    completed: CompletedLine,
    ready: bool,
    stats: AssemblerStats,
}

impl ReceiveAssembler {
    /// Create an empty assembler
    #[must_use]
    pub const fn new(framing: Framing) -> Self {
        Self {
            framing,
            buffer: [0; RX_BUFFER_SIZE],
            cursor: 0,
            completed: CompletedLine::empty(),
            ready: false,
            stats: AssemblerStats {
                dropped: 0,
                overwritten: 0,
                resets: 0,
            },
        }
    }

    /// Active framing
    #[must_use]
    pub const fn framing(&self) -> Framing {
        self.framing
    }

    /// Feed a chunk of bytes in delivery order
    pub fn push_slice(&mut self, data: &[u8]) {
        for &byte in data {
            self.push(byte);
        }
    }

    /// Feed one byte
    pub fn push(&mut self, byte: u8) {
        match self.framing {
            Framing::Line => self.push_line(byte),
            Framing::HexToken => self.push_hex(byte),
        }
    }

    fn push_line(&mut self, byte: u8) {
        if byte == b'\n' || byte == b'\r' {
            if self.cursor > 0 {
                self.complete();
            }
        } else if self.cursor < RX_BUFFER_SIZE - 1 {
            self.buffer[self.cursor] = byte;
            self.cursor += 1;
        } else {
            self.stats.dropped = self.stats.dropped.saturating_add(1);
        }
    }

    fn push_hex(&mut self, byte: u8) {
        if byte == TOKEN_RESET || self.cursor >= RX_BUFFER_SIZE - 1 {
            self.discard();
        }

        if byte.is_ascii_hexdigit() {
            self.buffer[self.cursor] = byte;
            self.cursor += 1;
        } else {
            self.discard();
        }

        if self.cursor >= HEX_TOKEN_DIGITS {
            self.complete();
        }
    }

    fn discard(&mut self) {
        if self.cursor > 0 {
            self.stats.resets = self.stats.resets.saturating_add(1);
        }
        self.cursor = 0;
    }

    fn complete(&mut self) {
        if self.ready {
            self.stats.overwritten = self.stats.overwritten.saturating_add(1);
        }
        self.completed.fill(&self.buffer[..self.cursor]);
        self.ready = true;
        self.cursor = 0;
    }

    /// Is a completed command waiting?
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Take the completed command, at most once
    pub fn take_line(&mut self) -> Option<CompletedLine> {
        if self.ready {
            self.ready = false;
            Some(self.completed.clone())
        } else {
            None
        }
    }

    /// Number of bytes accumulated toward the next command
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes accumulated toward the next command
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer[..self.cursor]
    }

    /// Diagnostic counters
    #[must_use]
    pub const fn stats(&self) -> AssemblerStats {
        self.stats
    }

    /// Drop the partial command and any unconsumed completion
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.ready = false;
    }
}

impl Default for ReceiveAssembler {
    fn default() -> Self {
        Self::new(Framing::Line)
    }
}
