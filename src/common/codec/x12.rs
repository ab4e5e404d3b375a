use log::trace;

use super::c40::pack_triplet;
use super::context::EncoderContext;
use super::lookahead::look_ahead_test;
use super::types::{is_native_x12, Encodation, LATCH_TO_ANSIX12, UNLATCH};
use crate::utils::{DMError, DMResult};

// X12 encodation
//------------------------------------------------------------------------------

pub fn encode(ctx: &mut EncoderContext) -> DMResult<()> {
    let mut buffer = Vec::with_capacity(3);
    while ctx.has_more_characters() {
        let pos = ctx.pos();
        let ch = ctx.next_char()?;
        buffer.push(encode_char(ch, pos)?);

        if buffer.len() == 3 {
            ctx.write_codewords(&pack_triplet(buffer[0], buffer[1], buffer[2]))?;
            buffer.clear();

            let next = look_ahead_test(ctx.message(), ctx.pos(), Encodation::X12);
            if next != Encodation::X12 {
                trace!("Leaving X12 at {}, lookahead prefers {next}", ctx.pos());
                ctx.signal_encoder_change(Encodation::Ascii);
                break;
            }
        }
    }
    // Partial triplet is re-encoded in ASCII
    ctx.retreat_by(buffer.len())?;
    handle_eod(ctx)
}

/// Encodes the longest run of whole X12 triplets from the cursor.
pub fn encode_maximal(ctx: &mut EncoderContext) -> DMResult<()> {
    let mut values = Vec::new();
    while let Some(ch) = ctx.peek(0).filter(|&c| is_native_x12(c)) {
        values.push(encode_char(ch, ctx.pos())?);
        ctx.advance_by(1)?;
    }
    let partial = values.len() % 3;
    values.truncate(values.len() - partial);
    ctx.retreat_by(partial)?;

    if values.is_empty() {
        ctx.signal_encoder_change(Encodation::Ascii);
        return Ok(());
    }

    ctx.write_codeword(LATCH_TO_ANSIX12)?;
    for triplet in values.chunks_exact(3) {
        ctx.write_codewords(&pack_triplet(triplet[0], triplet[1], triplet[2]))?;
    }
    handle_eod(ctx)
}

pub fn encode_char(ch: u8, pos: usize) -> DMResult<u8> {
    match ch {
        b'\r' => Ok(0),
        b'*' => Ok(1),
        b'>' => Ok(2),
        b' ' => Ok(3),
        b'0'..=b'9' => Ok(ch - b'0' + 4),
        b'A'..=b'Z' => Ok(ch - b'A' + 14),
        _ => Err(DMError::UnencodableChar { pos, byte: ch, encodation: Encodation::X12 }),
    }
}

// The unlatch is skipped only when a single ASCII codeword exactly fills the
// last free codeword.
fn handle_eod(ctx: &mut EncoderContext) -> DMResult<()> {
    let available = ctx.refresh_symbol_info()?.data_capacity() - ctx.codeword_count();
    let remaining = ctx.remaining_ascii_cost();
    if remaining > 1 || available > 1 || remaining != available {
        ctx.write_codeword(UNLATCH)?;
    }
    if ctx.new_encodation().is_none() {
        ctx.signal_encoder_change(Encodation::Ascii);
    }
    Ok(())
}
