use thiserror::Error;

use crate::codec::Encodation;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq, Copy, Clone)]
pub enum DMError {
    // Input
    #[error("Empty data")]
    EmptyData,
    #[error("Invalid character {ch:?} at position {pos}")]
    InvalidChar { pos: usize, ch: char },
    #[error("Byte {byte:#04x} at position {pos} cannot be encoded in {encodation:?} encodation")]
    UnencodableChar { pos: usize, byte: u8, encodation: Encodation },

    // Capacity
    #[error("Data too long: {codewords} codewords exceed the largest allowed symbol")]
    DataTooLong { codewords: usize },

    // Configuration
    #[error("Invalid symbol size constraint")]
    InvalidSizeConstraint,
    #[error("Unsupported character set: {0}")]
    UnsupportedCharset(&'static str),

    // Encoder consistency
    #[error("Position {0} is out of range")]
    PositionOutOfRange(usize),
    #[error("Internal encoder fault: {0}")]
    Internal(&'static str),
}

pub type DMResult<T> = Result<T, DMError>;
