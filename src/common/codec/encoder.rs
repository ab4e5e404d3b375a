use log::{debug, trace};

use super::context::EncoderContext;
use super::types::{
    Encodation, ECI, MACRO_05, MACRO_05_HEADER, MACRO_06, MACRO_06_HEADER, MACRO_TRAILER, PAD,
    UNLATCH,
};
use crate::metadata::{SymbolConstraints, SymbolInfo};
use crate::utils::{DMError, DMResult};

// Encoder
//------------------------------------------------------------------------------

/// Settings of one high-level encoding run.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub struct EncodeOptions {
    pub constraints: SymbolConstraints,
    /// Encodation the message is started in, run as far as it can go.
    pub forced: Option<Encodation>,
    /// ECI assignment announced before the data.
    pub eci: Option<u32>,
}

/// Data codewords of a symbol, padded to its capacity.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct HighLevelEncoding {
    pub codewords: Vec<u8>,
    /// Codewords before padding.
    pub data_len: usize,
    pub symbol: &'static SymbolInfo,
}

pub fn encode_high_level(msg: &[u8], opts: &EncodeOptions) -> DMResult<HighLevelEncoding> {
    if msg.is_empty() {
        return Err(DMError::EmptyData);
    }

    let mut ctx = EncoderContext::new(msg, opts.constraints);

    if let Some(macro_cw) = detect_macro(msg) {
        trace!("Macro {macro_cw} header detected");
        ctx.write_codeword(macro_cw)?;
        ctx.set_skip_at_end(MACRO_TRAILER.len());
        ctx.advance_by(MACRO_05_HEADER.len())?;
    }

    if let Some(eci) = opts.eci {
        ctx.write_codewords(&eci_designator(eci))?;
    }

    let mut encodation = Encodation::Ascii;
    if let Some(forced) = opts.forced {
        trace!("Forcing {forced} at {}", ctx.pos());
        forced.encode_maximal(&mut ctx)?;
        encodation = ctx.take_encoder_signal().unwrap_or(Encodation::Ascii);
    }

    let mut stalls = 0;
    while ctx.has_more_characters() {
        let pos = ctx.pos();
        encodation.encode(&mut ctx)?;
        if let Some(next) = ctx.take_encoder_signal() {
            if next != encodation {
                trace!("Switching from {encodation} to {next} at {}", ctx.pos());
            }
            encodation = next;
        }

        stalls = if ctx.pos() == pos { stalls + 1 } else { 0 };
        if stalls >= 3 {
            return Err(DMError::Internal("Encoder made no progress"));
        }
    }

    let symbol = ctx.refresh_symbol_info()?;
    let capacity = symbol.data_capacity();
    if ctx.codeword_count() < capacity && encodation.needs_unlatch() {
        ctx.write_codeword(UNLATCH)?;
    }

    let mut codewords = ctx.into_codewords();
    let data_len = codewords.len();
    pad_remaining_capacity(&mut codewords, capacity);
    debug!("Encoded {} bytes into {data_len} codewords, symbol {}", msg.len(), symbol.size());

    Ok(HighLevelEncoding { codewords, data_len, symbol })
}

fn detect_macro(msg: &[u8]) -> Option<u8> {
    if !msg.ends_with(MACRO_TRAILER) {
        return None;
    }
    if msg.starts_with(MACRO_05_HEADER) {
        Some(MACRO_05)
    } else if msg.starts_with(MACRO_06_HEADER) {
        Some(MACRO_06)
    } else {
        None
    }
}

/// ECI codeword followed by the one to three byte assignment number.
pub fn eci_designator(value: u32) -> Vec<u8> {
    debug_assert!(value <= 999_999, "ECI {value} out of range");
    match value {
        0..=126 => vec![ECI, (value + 1) as u8],
        127..=16_382 => {
            let v = value - 127;
            vec![ECI, (v / 254 + 128) as u8, (v % 254 + 1) as u8]
        }
        _ => {
            let v = value - 16_383;
            vec![
                ECI,
                (v / 64_516 + 192) as u8,
                ((v / 254) % 254 + 1) as u8,
                (v % 254 + 1) as u8,
            ]
        }
    }
}

// Padding
//------------------------------------------------------------------------------

fn pad_remaining_capacity(codewords: &mut Vec<u8>, capacity: usize) {
    if codewords.len() < capacity {
        codewords.push(PAD);
    }
    while codewords.len() < capacity {
        let position = codewords.len() + 1;
        codewords.push(randomize_253(PAD, position));
    }
}

/// 253-state randomising of pad codewords. `position` is 1-based.
pub fn randomize_253(value: u8, position: usize) -> u8 {
    let pseudo_random = ((149 * position) % 253) + 1;
    let tmp = value as usize + pseudo_random;
    if tmp <= 254 {
        tmp as u8
    } else {
        (tmp - 254) as u8
    }
}
