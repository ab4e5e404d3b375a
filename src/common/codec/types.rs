use std::fmt::{Display, Formatter};

use super::{ascii, base256, c40, context::EncoderContext, edifact, text, x12};
use crate::utils::DMResult;

// Codewords
//------------------------------------------------------------------------------

pub const PAD: u8 = 129;
pub const LATCH_TO_C40: u8 = 230;
pub const LATCH_TO_BASE256: u8 = 231;
pub const UPPER_SHIFT: u8 = 235;
pub const MACRO_05: u8 = 236;
pub const MACRO_06: u8 = 237;
pub const LATCH_TO_ANSIX12: u8 = 238;
pub const LATCH_TO_TEXT: u8 = 239;
pub const LATCH_TO_EDIFACT: u8 = 240;
pub const ECI: u8 = 241;

/// Unlatch from C40, Text and X12 back to ASCII
pub const UNLATCH: u8 = 254;

/// Unlatch value inside an EDIFACT group
pub const EDIFACT_UNLATCH: u8 = 31;

pub const MACRO_05_HEADER: &[u8] = b"[)>\x1E05\x1D";
pub const MACRO_06_HEADER: &[u8] = b"[)>\x1E06\x1D";
pub const MACRO_TRAILER: &[u8] = b"\x1E\x04";

// Encodation
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Encodation {
    Ascii = 0,
    C40 = 1,
    Text = 2,
    X12 = 3,
    Edifact = 4,
    Base256 = 5,
}

pub const ENCODATIONS: [Encodation; 6] = [
    Encodation::Ascii,
    Encodation::C40,
    Encodation::Text,
    Encodation::X12,
    Encodation::Edifact,
    Encodation::Base256,
];

impl Encodation {
    /// Codeword that latches to this encodation from ASCII.
    pub fn latch(&self) -> Option<u8> {
        match self {
            Self::Ascii => None,
            Self::C40 => Some(LATCH_TO_C40),
            Self::Text => Some(LATCH_TO_TEXT),
            Self::X12 => Some(LATCH_TO_ANSIX12),
            Self::Edifact => Some(LATCH_TO_EDIFACT),
            Self::Base256 => Some(LATCH_TO_BASE256),
        }
    }

    /// Number of encode values packed together. A mode switch only happens on
    /// a multiple of this.
    pub fn alignment(&self) -> usize {
        match self {
            Self::Ascii | Self::Base256 => 1,
            Self::C40 | Self::Text | Self::X12 => 3,
            Self::Edifact => 4,
        }
    }

    /// Whether the segment has to be closed with an explicit unlatch codeword
    /// when the symbol still has room after it.
    pub fn needs_unlatch(&self) -> bool {
        matches!(self, Self::C40 | Self::Text | Self::X12)
    }

    pub(crate) fn encode(&self, ctx: &mut EncoderContext) -> DMResult<()> {
        match self {
            Self::Ascii => ascii::encode(ctx),
            Self::C40 => c40::encode(ctx),
            Self::Text => text::encode(ctx),
            Self::X12 => x12::encode(ctx),
            Self::Edifact => edifact::encode(ctx),
            Self::Base256 => base256::encode(ctx),
        }
    }

    pub(crate) fn encode_maximal(&self, ctx: &mut EncoderContext) -> DMResult<()> {
        match self {
            Self::Ascii => ascii::encode_maximal(ctx),
            Self::C40 => c40::encode_maximal(ctx),
            Self::Text => text::encode_maximal(ctx),
            Self::X12 => x12::encode_maximal(ctx),
            Self::Edifact => edifact::encode_maximal(ctx),
            Self::Base256 => base256::encode_maximal(ctx),
        }
    }
}

impl Display for Encodation {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            Self::Ascii => "ASCII",
            Self::C40 => "C40",
            Self::Text => "Text",
            Self::X12 => "X12",
            Self::Edifact => "EDIFACT",
            Self::Base256 => "Base256",
        };
        f.write_str(name)
    }
}

// Character classes
//------------------------------------------------------------------------------

#[inline]
pub fn is_digit(ch: u8) -> bool {
    ch.is_ascii_digit()
}

#[inline]
pub fn is_extended_ascii(ch: u8) -> bool {
    ch >= 128
}

#[inline]
pub fn is_native_c40(ch: u8) -> bool {
    matches!(ch, b' ' | b'0'..=b'9' | b'A'..=b'Z')
}

#[inline]
pub fn is_native_text(ch: u8) -> bool {
    matches!(ch, b' ' | b'0'..=b'9' | b'a'..=b'z')
}

#[inline]
pub fn is_x12_term_sep(ch: u8) -> bool {
    matches!(ch, b'\r' | b'*' | b'>')
}

#[inline]
pub fn is_native_x12(ch: u8) -> bool {
    is_x12_term_sep(ch) || is_native_c40(ch)
}

#[inline]
pub fn is_native_edifact(ch: u8) -> bool {
    (b' '..=b'^').contains(&ch)
}

// Mode-local buffer
//------------------------------------------------------------------------------

/// Position and buffer length saved on an alignment boundary.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Checkpoint {
    pub pos: usize,
    pub buffer_len: usize,
    units: usize,
}

/// Encode values not yet packed into codewords, along with the number of
/// values each consumed input character produced.
#[derive(Debug, Default, Clone)]
pub struct UnitBuffer {
    values: Vec<u8>,
    units: Vec<usize>,
}

impl UnitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Encodes one input character with `encode_char` and records its size.
    pub fn push_unit<F>(&mut self, encode_char: F) -> DMResult<usize>
    where
        F: FnOnce(&mut Vec<u8>) -> DMResult<usize>,
    {
        let size = encode_char(&mut self.values)?;
        debug_assert!(size > 0, "Character produced no encode values");
        self.units.push(size);
        Ok(size)
    }

    pub fn push_value(&mut self, value: u8) {
        self.values.push(value);
        self.units.push(1);
    }

    pub fn last_unit_size(&self) -> Option<usize> {
        self.units.last().copied()
    }

    /// Removes every value of the most recent unit.
    pub fn pop_unit(&mut self) -> Option<usize> {
        let size = self.units.pop()?;
        self.values.truncate(self.values.len() - size);
        Some(size)
    }

    pub fn checkpoint(&self, pos: usize) -> Checkpoint {
        Checkpoint { pos, buffer_len: self.values.len(), units: self.units.len() }
    }

    pub fn rollback(&mut self, cp: &Checkpoint) {
        self.values.truncate(cp.buffer_len);
        self.units.truncate(cp.units);
    }

    /// Removes the first `n` values. A unit split by the cut keeps only its
    /// remaining values.
    pub fn drain_front(&mut self, n: usize) {
        debug_assert!(n <= self.values.len(), "Cannot drain {n} of {} values", self.values.len());
        self.values.drain(..n);
        let mut left = n;
        let mut whole = 0;
        for size in self.units.iter_mut() {
            if left == 0 {
                break;
            }
            if *size <= left {
                left -= *size;
                whole += 1;
            } else {
                *size -= left;
                left = 0;
            }
        }
        self.units.drain(..whole);
    }
}

#[cfg(test)]
mod encodation_tests {
    use super::*;

    #[test]
    fn test_latch() {
        assert_eq!(Encodation::Ascii.latch(), None);
        assert_eq!(Encodation::C40.latch(), Some(230));
        assert_eq!(Encodation::Text.latch(), Some(239));
        assert_eq!(Encodation::X12.latch(), Some(238));
        assert_eq!(Encodation::Edifact.latch(), Some(240));
        assert_eq!(Encodation::Base256.latch(), Some(231));
    }

    #[test]
    fn test_character_classes() {
        assert!(is_native_c40(b'A') && is_native_c40(b' ') && is_native_c40(b'7'));
        assert!(!is_native_c40(b'a'));
        assert!(is_native_text(b'z') && !is_native_text(b'Z'));
        assert!(is_native_x12(b'\r') && is_native_x12(b'*') && is_native_x12(b'>'));
        assert!(!is_native_x12(b'.'));
        assert!(is_native_edifact(b' ') && is_native_edifact(b'^'));
        assert!(!is_native_edifact(b'_') && !is_native_edifact(b'a'));
        assert!(is_extended_ascii(128) && !is_extended_ascii(127));
    }
}
