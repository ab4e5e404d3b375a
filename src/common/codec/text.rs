use super::c40::{encode_triplets, encode_triplets_maximal};
use super::context::EncoderContext;
use super::types::Encodation;
use crate::utils::DMResult;

// Text encodation
//------------------------------------------------------------------------------

pub fn encode(ctx: &mut EncoderContext) -> DMResult<()> {
    encode_triplets(ctx, Encodation::Text, encode_char)
}

pub fn encode_maximal(ctx: &mut EncoderContext) -> DMResult<()> {
    encode_triplets_maximal(ctx, Encodation::Text, encode_char)
}

/// Same layout as C40 with the letter cases swapped: lowercase is basic and
/// uppercase moves to shift 3.
pub fn encode_char(ch: u8, out: &mut Vec<u8>) -> usize {
    match ch {
        b' ' => {
            out.push(3);
            1
        }
        b'0'..=b'9' => {
            out.push(ch - b'0' + 4);
            1
        }
        b'a'..=b'z' => {
            out.push(ch - b'a' + 14);
            1
        }
        0..=31 => {
            out.extend([0, ch]);
            2
        }
        33..=47 => {
            out.extend([1, ch - 33]);
            2
        }
        58..=64 => {
            out.extend([1, ch - 58 + 15]);
            2
        }
        91..=95 => {
            out.extend([1, ch - 91 + 22]);
            2
        }
        b'`' => {
            out.extend([2, 0]);
            2
        }
        b'A'..=b'Z' => {
            out.extend([2, ch - b'A' + 1]);
            2
        }
        123..=127 => {
            out.extend([2, ch - 123 + 27]);
            2
        }
        128..=255 => {
            out.extend([1, 30]);
            2 + encode_char(ch - 128, out)
        }
    }
}
