//! Reference decoder for Data Matrix data codewords, used to round-trip the
//! encoder output.

use dmism::{unpack_triplet, unrandomize_255};

const MACRO_05_HEADER: &[u8] = b"[)>\x1E05\x1D";
const MACRO_06_HEADER: &[u8] = b"[)>\x1E06\x1D";
const MACRO_TRAILER: &[u8] = b"\x1E\x04";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    pub data: Vec<u8>,
    pub eci: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Triplets {
    C40,
    Text,
    X12,
}

pub fn decode(codewords: &[u8]) -> Result<Decoded, String> {
    let mut res = Decoded::default();
    let mut trailer = false;
    let mut upper_shift = false;
    let mut i = 0;
    while i < codewords.len() {
        let cw = codewords[i];
        i += 1;
        match cw {
            1..=128 => {
                res.data.push(cw - 1 + if upper_shift { 128 } else { 0 });
                upper_shift = false;
            }
            129 => break,
            130..=229 => {
                let v = cw - 130;
                res.data.extend([b'0' + v / 10, b'0' + v % 10]);
            }
            230 => i = decode_triplets(codewords, i, Triplets::C40, &mut res.data)?,
            231 => i = decode_base256(codewords, i, &mut res.data)?,
            235 => upper_shift = true,
            236 | 237 if i == 1 => {
                res.data.extend(if cw == 236 { MACRO_05_HEADER } else { MACRO_06_HEADER });
                trailer = true;
            }
            238 => i = decode_triplets(codewords, i, Triplets::X12, &mut res.data)?,
            239 => i = decode_triplets(codewords, i, Triplets::Text, &mut res.data)?,
            240 => i = decode_edifact(codewords, i, &mut res.data)?,
            241 => {
                let (eci, next) = decode_eci(codewords, i)?;
                res.eci = Some(eci);
                i = next;
            }
            _ => return Err(format!("Unexpected codeword {cw} at {}", i - 1)),
        }
    }
    if trailer {
        res.data.extend(MACRO_TRAILER);
    }
    Ok(res)
}

fn decode_eci(cws: &[u8], i: usize) -> Result<(u32, usize), String> {
    let at = |k: usize| cws.get(k).map(|&c| c as u32).ok_or("Truncated ECI designator");
    let c1 = at(i)?;
    match c1 {
        1..=127 => Ok((c1 - 1, i + 1)),
        128..=191 => Ok(((c1 - 128) * 254 + at(i + 1)? - 1 + 127, i + 2)),
        _ => Ok(((c1 - 192) * 64_516 + (at(i + 1)? - 1) * 254 + at(i + 2)? - 1 + 16_383, i + 3)),
    }
}

fn decode_triplets(cws: &[u8], mut i: usize, set: Triplets, out: &mut Vec<u8>) -> Result<usize, String> {
    let mut shift = 0;
    let mut upper_shift = false;
    loop {
        if i >= cws.len() {
            return Ok(i);
        }
        if cws[i] == 254 {
            return Ok(i + 1);
        }
        // A lone codeword left over is ASCII
        if i + 1 >= cws.len() {
            return Ok(i);
        }
        let values = unpack_triplet(cws[i], cws[i + 1])
            .ok_or_else(|| format!("Invalid triplet {} {} at {i}", cws[i], cws[i + 1]))?;
        i += 2;

        for v in values {
            let ch = match (set, shift) {
                (Triplets::X12, _) => Some(match v {
                    0 => b'\r',
                    1 => b'*',
                    2 => b'>',
                    3 => b' ',
                    4..=13 => b'0' + v - 4,
                    14..=39 => b'A' + v - 14,
                    _ => return Err(format!("Invalid X12 value {v}")),
                }),
                (_, 0) => match v {
                    0..=2 => {
                        shift = v + 1;
                        None
                    }
                    3 => Some(b' '),
                    4..=13 => Some(b'0' + v - 4),
                    _ if set == Triplets::C40 => Some(b'A' + v - 14),
                    _ => Some(b'a' + v - 14),
                },
                (_, 1) => {
                    shift = 0;
                    Some(v)
                }
                (_, 2) => {
                    shift = 0;
                    match v {
                        0..=14 => Some(33 + v),
                        15..=21 => Some(58 + v - 15),
                        22..=26 => Some(91 + v - 22),
                        30 => {
                            upper_shift = true;
                            None
                        }
                        _ => return Err(format!("Unsupported shift 2 value {v}")),
                    }
                }
                (_, _) => {
                    shift = 0;
                    match (set, v) {
                        (Triplets::C40, 0..=31) => Some(96 + v),
                        (Triplets::Text, 0) => Some(b'`'),
                        (Triplets::Text, 1..=26) => Some(b'A' + v - 1),
                        (Triplets::Text, 27..=31) => Some(123 + v - 27),
                        _ => return Err(format!("Invalid shift 3 value {v}")),
                    }
                }
            };
            if let Some(ch) = ch {
                out.push(if upper_shift { ch + 128 } else { ch });
                upper_shift = false;
            }
        }
    }
}

fn decode_edifact(cws: &[u8], mut i: usize, out: &mut Vec<u8>) -> Result<usize, String> {
    loop {
        // Two or fewer codewords left are ASCII
        if cws.len() - i <= 2 {
            return Ok(i);
        }
        let group = (cws[i] as u32) << 16 | (cws[i + 1] as u32) << 8 | cws[i + 2] as u32;
        for k in 0..4u32 {
            let v = ((group >> (18 - 6 * k)) & 0x3F) as u8;
            if v == 31 {
                // Resume at the next byte boundary
                return Ok(i + (6 * (k + 1)).div_ceil(8) as usize);
            }
            out.push(if v < 32 { v + 64 } else { v });
        }
        i += 3;
    }
}

fn decode_base256(cws: &[u8], mut i: usize, out: &mut Vec<u8>) -> Result<usize, String> {
    let next = |i: &mut usize| -> Result<u8, String> {
        let cw = *cws.get(*i).ok_or("Truncated Base256 field")?;
        *i += 1;
        Ok(unrandomize_255(cw, *i))
    };
    let d1 = next(&mut i)? as usize;
    let count = match d1 {
        0 => cws.len() - i,
        1..=249 => d1,
        _ => 250 * (d1 - 249) + next(&mut i)? as usize,
    };
    for _ in 0..count {
        out.push(next(&mut i)?);
    }
    Ok(i)
}
