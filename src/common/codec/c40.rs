use log::trace;

use super::context::EncoderContext;
use super::lookahead::look_ahead_test;
use super::types::{Encodation, UnitBuffer, UNLATCH};
use crate::utils::{DMError, DMResult};

/// Maps one input character to its encode values and returns how many it
/// produced.
pub(super) type CharEncoder = fn(u8, &mut Vec<u8>) -> usize;

// C40 encodation
//------------------------------------------------------------------------------

pub fn encode(ctx: &mut EncoderContext) -> DMResult<()> {
    encode_triplets(ctx, Encodation::C40, encode_char)
}

pub fn encode_maximal(ctx: &mut EncoderContext) -> DMResult<()> {
    encode_triplets_maximal(ctx, Encodation::C40, encode_char)
}

/// Basic set holds space, digits and uppercase letters. Everything else goes
/// through shift 1, 2 or 3, and extended characters are prefixed with an
/// upper shift.
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
        b'A'..=b'Z' => {
            out.push(ch - b'A' + 14);
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
        96..=127 => {
            out.extend([2, ch - 96]);
            2
        }
        128..=255 => {
            out.extend([1, 30]);
            2 + encode_char(ch - 128, out)
        }
    }
}

// Triplet packing
//------------------------------------------------------------------------------

/// Packs three values below 40 into two codewords.
pub fn pack_triplet(c1: u8, c2: u8, c3: u8) -> [u8; 2] {
    debug_assert!(c1 < 40 && c2 < 40 && c3 < 40, "Triplet value out of range");
    let v = 1600 * c1 as u16 + 40 * c2 as u16 + c3 as u16 + 1;
    [(v >> 8) as u8, (v & 0xFF) as u8]
}

/// Inverse of [`pack_triplet`]. Returns `None` for a codeword pair no triplet
/// maps to.
pub fn unpack_triplet(cw1: u8, cw2: u8) -> Option<[u8; 3]> {
    let v = (cw1 as u16) << 8 | cw2 as u16;
    if v == 0 || v > 64000 {
        return None;
    }
    let v = v - 1;
    Some([(v / 1600) as u8, ((v / 40) % 40) as u8, (v % 40) as u8])
}

fn write_triplets(ctx: &mut EncoderContext, buffer: &mut UnitBuffer) -> DMResult<()> {
    while buffer.len() >= 3 {
        let v = buffer.values();
        let codewords = pack_triplet(v[0], v[1], v[2]);
        ctx.write_codewords(&codewords)?;
        buffer.drain_front(3);
    }
    Ok(())
}

// Shared C40 and Text machinery
//------------------------------------------------------------------------------

pub(super) fn encode_triplets(
    ctx: &mut EncoderContext,
    encodation: Encodation,
    encode_char: CharEncoder,
) -> DMResult<()> {
    let mut buffer = UnitBuffer::new();
    while ctx.has_more_characters() {
        let ch = ctx.next_char()?;
        buffer.push_unit(|out| Ok(encode_char(ch, out)))?;

        let current = ctx.codeword_count() + (buffer.len() / 3) * 2;
        let available = ctx.available(current)?;

        if !ctx.has_more_characters() {
            // Trim the tail so the end of data handler can close the segment
            if buffer.len() % 3 == 2 && available != 2 {
                backtrack_one_character(ctx, &mut buffer)?;
            }
            while buffer.len() % 3 == 1
                && (buffer.last_unit_size() != Some(1) || available != 1)
            {
                backtrack_one_character(ctx, &mut buffer)?;
            }
            break;
        }

        if buffer.len() % 3 == 0 {
            let next = look_ahead_test(ctx.message(), ctx.pos(), encodation);
            if next != encodation {
                trace!("Leaving {encodation} at {}, lookahead prefers {next}", ctx.pos());
                ctx.signal_encoder_change(Encodation::Ascii);
                break;
            }
        }
    }
    handle_eod(ctx, &mut buffer)
}

pub(super) fn encode_triplets_maximal(
    ctx: &mut EncoderContext,
    encodation: Encodation,
    encode_char: CharEncoder,
) -> DMResult<()> {
    let mut buffer = UnitBuffer::new();
    let mut checkpoint = ctx.checkpoint(&buffer);
    while ctx.has_more_characters() {
        let ch = ctx.next_char()?;
        buffer.push_unit(|out| Ok(encode_char(ch, out)))?;
        if buffer.len() % 3 == 0 {
            checkpoint = ctx.checkpoint(&buffer);
        }
    }

    if checkpoint.buffer_len != buffer.len() {
        // Latch not written yet
        let current = ctx.codeword_count() + (buffer.len() / 3) * 2 + 1;
        let available = ctx.available(current)?;
        let rest = buffer.len() % 3;
        let last_unit = buffer.last_unit_size();
        if (rest == 2 && available != 2) || (rest == 1 && (last_unit != Some(1) || available != 1))
        {
            ctx.rollback(&mut buffer, &checkpoint);
        }
    }

    if buffer.is_empty() {
        ctx.signal_encoder_change(Encodation::Ascii);
        return Ok(());
    }

    let latch = encodation.latch().ok_or(DMError::Internal("Missing latch codeword"))?;
    ctx.write_codeword(latch)?;
    handle_eod(ctx, &mut buffer)
}

fn backtrack_one_character(ctx: &mut EncoderContext, buffer: &mut UnitBuffer) -> DMResult<()> {
    let size = buffer.pop_unit().ok_or(DMError::Internal("Nothing to backtrack"))?;
    ctx.retreat_by(1)?;
    trace!("Backtracked {size} values to {}", ctx.pos());
    ctx.reset_symbol_info();
    Ok(())
}

/// Flushes the buffered values and closes the segment. Remaining values are
/// either padded into a final triplet or handed back to ASCII.
fn handle_eod(ctx: &mut EncoderContext, buffer: &mut UnitBuffer) -> DMResult<()> {
    let unwritten = (buffer.len() / 3) * 2;
    let rest = buffer.len() % 3;
    let current = ctx.codeword_count() + unwritten;
    let available = ctx.available(current)?;

    match rest {
        2 => {
            buffer.push_value(0);
            write_triplets(ctx, buffer)?;
            if ctx.has_more_characters() {
                ctx.write_codeword(UNLATCH)?;
            }
        }
        1 if available == 1 && buffer.last_unit_size() == Some(1) => {
            write_triplets(ctx, buffer)?;
            if ctx.has_more_characters() {
                ctx.write_codeword(UNLATCH)?;
            }
            // Last character is re-encoded in ASCII
            ctx.retreat_by(1)?;
        }
        0 => {
            write_triplets(ctx, buffer)?;
            if available > 0 || ctx.has_more_characters() {
                ctx.write_codeword(UNLATCH)?;
            }
        }
        _ => return Err(DMError::Internal("Unexpected C40/Text end of data state")),
    }

    ctx.signal_encoder_change(Encodation::Ascii);
    Ok(())
}
