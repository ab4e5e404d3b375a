use log::trace;

use super::context::EncoderContext;
use super::lookahead::look_ahead_test;
use super::types::{Encodation, LATCH_TO_BASE256};
use crate::utils::{DMError, DMResult};

// Base256 encodation
//------------------------------------------------------------------------------

pub fn encode(ctx: &mut EncoderContext) -> DMResult<()> {
    // Slot for the length field
    let mut buffer = vec![0u8];
    while ctx.has_more_characters() {
        buffer.push(ctx.next_char()?);

        let next = look_ahead_test(ctx.message(), ctx.pos(), Encodation::Base256);
        if next != Encodation::Base256 {
            trace!("Leaving Base256 at {}, lookahead prefers {next}", ctx.pos());
            ctx.signal_encoder_change(Encodation::Ascii);
            break;
        }
    }
    let more = ctx.has_more_characters();
    write_field(ctx, buffer, more)
}

/// Encodes every remaining byte in Base256.
pub fn encode_maximal(ctx: &mut EncoderContext) -> DMResult<()> {
    if !ctx.has_more_characters() {
        ctx.signal_encoder_change(Encodation::Ascii);
        return Ok(());
    }

    ctx.write_codeword(LATCH_TO_BASE256)?;
    let mut buffer = Vec::with_capacity(ctx.remaining_characters() + 1);
    buffer.push(0);
    while ctx.has_more_characters() {
        buffer.push(ctx.next_char()?);
    }
    write_field(ctx, buffer, false)?;
    ctx.signal_encoder_change(Encodation::Ascii);
    Ok(())
}

// A field running to the end of a full symbol keeps length 0. Otherwise the
// length takes one or two codewords.
fn write_field(ctx: &mut EncoderContext, mut buffer: Vec<u8>, more: bool) -> DMResult<()> {
    let data_count = buffer.len() - 1;
    let current = ctx.codeword_count() + data_count + 1;
    let must_pad = ctx.available(current)? > 0;

    if more || must_pad {
        match data_count {
            0..=249 => buffer[0] = data_count as u8,
            250..=1555 => {
                buffer[0] = (data_count / 250 + 249) as u8;
                buffer.insert(1, (data_count % 250) as u8);
            }
            _ => return Err(DMError::Internal("Base256 field longer than 1555 bytes")),
        }
    }

    for byte in buffer {
        let position = ctx.codeword_count() + 1;
        ctx.write_codeword(randomize_255(byte, position))?;
    }
    Ok(())
}

/// 255-state randomising applied to every codeword of a Base256 field.
/// `position` is the 1-based index of the codeword in the data stream.
pub fn randomize_255(value: u8, position: usize) -> u8 {
    let pseudo_random = ((149 * position) % 255) + 1;
    let tmp = value as usize + pseudo_random;
    if tmp <= 255 {
        tmp as u8
    } else {
        (tmp - 256) as u8
    }
}

/// Inverse of [`randomize_255`].
pub fn unrandomize_255(value: u8, position: usize) -> u8 {
    let pseudo_random = ((149 * position) % 255) + 1;
    let tmp = value as isize - pseudo_random as isize;
    if tmp >= 0 {
        tmp as u8
    } else {
        (tmp + 256) as u8
    }
}

#[cfg(test)]
mod base256_tests {
    use super::{encode, encode_maximal, randomize_255, unrandomize_255};
    use crate::codec::context::EncoderContext;
    use crate::codec::{Encodation, LATCH_TO_BASE256};
    use crate::metadata::SymbolConstraints;

    #[test]
    fn test_randomize_is_reversible() {
        for position in 1..=600 {
            for value in 0..=255u8 {
                assert_eq!(unrandomize_255(randomize_255(value, position), position), value);
            }
        }
    }

    #[test]
    fn test_field_fills_symbol() {
        let mut ctx = EncoderContext::new(b"\xAB\xE4\xF6\xFC\xE9\xBB", SymbolConstraints::default());
        ctx.write_codeword(LATCH_TO_BASE256).unwrap();
        encode(&mut ctx).unwrap();
        assert_eq!(ctx.codewords(), &[231, 44, 108, 59, 226, 126, 1, 104]);
        assert_eq!(ctx.take_encoder_signal(), None);
    }

    #[test]
    fn test_field_with_padding() {
        let mut ctx =
            EncoderContext::new(b"\xAB\xE4\xF6\xFC\xE9\xE0\xBB", SymbolConstraints::default());
        ctx.write_codeword(LATCH_TO_BASE256).unwrap();
        encode(&mut ctx).unwrap();
        assert_eq!(ctx.codewords(), &[231, 51, 108, 59, 226, 126, 1, 141, 254]);
    }

    #[test]
    fn test_long_field_length() {
        let msg = vec![0xFFu8; 300];
        let mut ctx = EncoderContext::new(&msg, SymbolConstraints::default());
        encode_maximal(&mut ctx).unwrap();
        let cws = ctx.codewords();
        assert_eq!(cws[0], 231);
        assert_eq!(unrandomize_255(cws[1], 2), 250);
        assert_eq!(unrandomize_255(cws[2], 3), 50);
        assert_eq!(cws.len(), 303);
        assert_eq!(ctx.take_encoder_signal(), Some(Encodation::Ascii));
    }
}
