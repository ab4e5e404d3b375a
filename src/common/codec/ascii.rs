use log::trace;

use super::context::EncoderContext;
use super::lookahead::look_ahead_test;
use super::types::{is_digit, is_extended_ascii, Encodation, UPPER_SHIFT};
use crate::utils::{DMError, DMResult};

// ASCII encodation
//------------------------------------------------------------------------------

/// Encodes one ASCII step: a digit pair, a single character, or a latch into
/// the encodation the lookahead prefers.
pub fn encode(ctx: &mut EncoderContext) -> DMResult<()> {
    let ch = ctx.current_char()?;
    if let Some(next) = ctx.peek(1).filter(|&n| is_digit(ch) && is_digit(n)) {
        ctx.write_codeword(encode_digit_pair(ch, next)?)?;
        return ctx.advance_by(2);
    }

    let next = look_ahead_test(ctx.message(), ctx.pos(), Encodation::Ascii);
    if next != Encodation::Ascii {
        trace!("Latching from ASCII to {next} at {}", ctx.pos());
        let latch = next.latch().ok_or(DMError::Internal("Missing latch codeword"))?;
        ctx.write_codeword(latch)?;
        ctx.signal_encoder_change(next);
        return Ok(());
    }

    write_char(ctx, ch)?;
    ctx.advance_by(1)
}

/// Encodes the rest of the message in ASCII.
pub fn encode_maximal(ctx: &mut EncoderContext) -> DMResult<()> {
    while ctx.has_more_characters() {
        let ch = ctx.current_char()?;
        match ctx.peek(1) {
            Some(next) if is_digit(ch) && is_digit(next) => {
                ctx.write_codeword(encode_digit_pair(ch, next)?)?;
                ctx.advance_by(2)?;
            }
            _ => {
                write_char(ctx, ch)?;
                ctx.advance_by(1)?;
            }
        }
    }
    ctx.signal_encoder_change(Encodation::Ascii);
    Ok(())
}

fn write_char(ctx: &mut EncoderContext, ch: u8) -> DMResult<()> {
    if is_extended_ascii(ch) {
        ctx.write_codewords(&[UPPER_SHIFT, ch - 128 + 1])
    } else {
        ctx.write_codeword(ch + 1)
    }
}

pub fn encode_digit_pair(d1: u8, d2: u8) -> DMResult<u8> {
    if !is_digit(d1) || !is_digit(d2) {
        return Err(DMError::Internal("Digit pair expected"));
    }
    Ok((d1 - b'0') * 10 + (d2 - b'0') + 130)
}
