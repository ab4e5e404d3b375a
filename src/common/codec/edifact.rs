use log::trace;

use super::context::EncoderContext;
use super::lookahead::look_ahead_test;
use super::types::{is_native_edifact, Encodation, EDIFACT_UNLATCH, LATCH_TO_EDIFACT};
use crate::utils::{DMError, DMResult};

// EDIFACT encodation
//------------------------------------------------------------------------------

pub fn encode(ctx: &mut EncoderContext) -> DMResult<()> {
    let mut buffer = Vec::with_capacity(4);
    while ctx.has_more_characters() {
        let pos = ctx.pos();
        let ch = ctx.next_char()?;
        buffer.push(encode_char(ch, pos)?);

        if buffer.len() == 4 {
            ctx.write_codewords(&pack_values(&buffer))?;
            buffer.clear();

            let next = look_ahead_test(ctx.message(), ctx.pos(), Encodation::Edifact);
            if next != Encodation::Edifact {
                trace!("Leaving EDIFACT at {}, lookahead prefers {next}", ctx.pos());
                ctx.signal_encoder_change(Encodation::Ascii);
                break;
            }
        }
    }
    buffer.push(EDIFACT_UNLATCH);
    handle_eod(ctx, &buffer)
}

/// Encodes the longest run of EDIFACT characters from the cursor. A trailing
/// partial group is kept only when it ends the message.
pub fn encode_maximal(ctx: &mut EncoderContext) -> DMResult<()> {
    let mut values = Vec::new();
    while let Some(ch) = ctx.peek(0).filter(|&c| is_native_edifact(c)) {
        values.push(encode_char(ch, ctx.pos())?);
        ctx.advance_by(1)?;
    }
    if ctx.has_more_characters() {
        let partial = values.len() % 4;
        values.truncate(values.len() - partial);
        ctx.retreat_by(partial)?;
    }

    if values.is_empty() {
        ctx.signal_encoder_change(Encodation::Ascii);
        return Ok(());
    }

    ctx.write_codeword(LATCH_TO_EDIFACT)?;
    let whole = values.len() - values.len() % 4;
    for group in values[..whole].chunks_exact(4) {
        ctx.write_codewords(&pack_values(group))?;
    }
    let mut rest = values[whole..].to_vec();
    rest.push(EDIFACT_UNLATCH);
    handle_eod(ctx, &rest)
}

/// Six bit value of an EDIFACT character.
pub fn encode_char(ch: u8, pos: usize) -> DMResult<u8> {
    match ch {
        32..=63 => Ok(ch),
        64..=94 => Ok(ch - 64),
        _ => Err(DMError::UnencodableChar { pos, byte: ch, encodation: Encodation::Edifact }),
    }
}

/// Packs up to four six bit values, most significant first, keeping one
/// codeword per value up to three.
pub fn pack_values(values: &[u8]) -> Vec<u8> {
    debug_assert!(!values.is_empty() && values.len() <= 4, "EDIFACT group of {}", values.len());
    let v = values
        .iter()
        .chain(std::iter::repeat(&0))
        .take(4)
        .fold(0u32, |acc, &c| (acc << 6) | (c & 0x3F) as u32);
    let bytes = [(v >> 16) as u8, (v >> 8) as u8, v as u8];
    bytes[..values.len().clamp(1, 3)].to_vec()
}

/// Closes an EDIFACT segment. `buffer` holds the pending values followed by
/// the unlatch value. Up to two trailing characters may fall back to ASCII
/// when the symbol has no room for a packed group.
fn handle_eod(ctx: &mut EncoderContext, buffer: &[u8]) -> DMResult<()> {
    let res = close_segment(ctx, buffer);
    ctx.signal_encoder_change(Encodation::Ascii);
    res
}

fn close_segment(ctx: &mut EncoderContext, buffer: &[u8]) -> DMResult<()> {
    let count = buffer.len();
    if count == 0 {
        return Ok(());
    }

    if count == 1 {
        // Only the unlatch is pending
        let mut available = ctx.refresh_symbol_info()?.data_capacity() - ctx.codeword_count();
        let remaining = ctx.remaining_ascii_cost();
        if remaining > available {
            available = ctx.available(ctx.codeword_count() + 1)? + 1;
        }
        if remaining <= available && available <= 2 {
            return Ok(());
        }
    }

    if count > 4 {
        return Err(DMError::Internal("EDIFACT buffer holds more than four values"));
    }

    let rest = count - 1;
    let encoded = pack_values(buffer);
    let end_of_symbol = !ctx.has_more_characters();
    let mut rest_in_ascii = end_of_symbol && rest <= 2;

    if rest <= 2 {
        let current = ctx.codeword_count();
        let available = ctx.update_symbol_info(current + rest)?.data_capacity() - current;
        if available >= 3 {
            rest_in_ascii = false;
            ctx.update_symbol_info(current + encoded.len())?;
        }
    }

    if rest_in_ascii {
        ctx.reset_symbol_info();
        ctx.retreat_by(rest)
    } else {
        ctx.write_codewords(&encoded)
    }
}
