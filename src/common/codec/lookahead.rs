use super::types::{
    is_digit, is_extended_ascii, is_native_c40, is_native_edifact, is_native_text,
    is_native_x12, is_x12_term_sep, Encodation, ENCODATIONS,
};

// Lookahead
//------------------------------------------------------------------------------

// Costs are tracked in twelfths of a codeword so thirds and quarters stay
// exact.
const UNIT: u32 = 12;

#[derive(Debug, Clone, Copy)]
struct Costs([u32; 6]);

impl Costs {
    fn initial(current: Encodation) -> Self {
        let mut costs = match current {
            Encodation::Ascii => [0, UNIT, UNIT, UNIT, UNIT, UNIT + 3],
            _ => [UNIT, 2 * UNIT, 2 * UNIT, 2 * UNIT, 2 * UNIT, 2 * UNIT + 3],
        };
        costs[current as usize] = 0;
        Self(costs)
    }

    fn add_char(&mut self, ch: u8) {
        let c = &mut self.0;
        let ext = is_extended_ascii(ch);

        let ascii = &mut c[Encodation::Ascii as usize];
        *ascii = if is_digit(ch) {
            *ascii + UNIT / 2
        } else if ext {
            ceil_units(*ascii) * UNIT + 2 * UNIT
        } else {
            ceil_units(*ascii) * UNIT + UNIT
        };

        c[Encodation::C40 as usize] += step(is_native_c40(ch), ext, 8, 32, 16);
        c[Encodation::Text as usize] += step(is_native_text(ch), ext, 8, 32, 16);
        c[Encodation::X12 as usize] += step(is_native_x12(ch), ext, 8, 52, 40);
        c[Encodation::Edifact as usize] += step(is_native_edifact(ch), ext, 9, 51, 39);
        c[Encodation::Base256 as usize] += UNIT;
    }

    fn rounded(&self) -> [u32; 6] {
        self.0.map(ceil_units)
    }
}

#[inline]
fn step(native: bool, extended: bool, native_cost: u32, extended_cost: u32, other_cost: u32) -> u32 {
    if native {
        native_cost
    } else if extended {
        extended_cost
    } else {
        other_cost
    }
}

#[inline]
fn ceil_units(cost: u32) -> u32 {
    cost.div_ceil(UNIT)
}

fn min_of(values: &[u32]) -> u32 {
    values.iter().copied().min().unwrap_or(u32::MAX)
}

/// Picks the encodation the message from `start` onwards should continue in,
/// given the encodation currently active.
pub fn look_ahead_test(msg: &[u8], start: usize, current: Encodation) -> Encodation {
    let next = look_ahead_test_intern(msg, start, current);
    let rest = msg.get(start..).unwrap_or(&[]);
    // X12 and EDIFACT are only chosen when the next group is encodable in them
    match next {
        Encodation::X12 if rest.iter().take(3).any(|&c| !is_native_x12(c)) => Encodation::Ascii,
        Encodation::Edifact if rest.iter().take(4).any(|&c| !is_native_edifact(c)) => {
            Encodation::Ascii
        }
        _ => next,
    }
}

fn look_ahead_test_intern(msg: &[u8], start: usize, current: Encodation) -> Encodation {
    if start >= msg.len() {
        return current;
    }

    let mut costs = Costs::initial(current);
    let mut n = 0;
    loop {
        if start + n == msg.len() {
            return end_of_data_choice(&costs);
        }

        costs.add_char(msg[start + n]);
        n += 1;

        if n < 4 {
            continue;
        }

        let [a, c, t, x, e, b] = costs.rounded();
        if a < min_of(&[b, c, t, x, e]) {
            return Encodation::Ascii;
        }
        if b < a || b + 1 < min_of(&[c, t, x, e]) {
            return Encodation::Base256;
        }
        if e + 1 < min_of(&[b, c, t, x, a]) {
            return Encodation::Edifact;
        }
        if t + 1 < min_of(&[b, c, e, x, a]) {
            return Encodation::Text;
        }
        if x + 1 < min_of(&[b, c, e, t, a]) {
            return Encodation::X12;
        }
        if c + 1 < min_of(&[a, b, e, t]) {
            if c < x {
                return Encodation::C40;
            }
            if c == x {
                // Prefer X12 if a terminator or separator follows in the run
                for &ch in msg.iter().skip(start + n + 1) {
                    if is_x12_term_sep(ch) {
                        return Encodation::X12;
                    }
                    if !is_native_x12(ch) {
                        break;
                    }
                }
                return Encodation::C40;
            }
        }
    }
}

// ASCII wins any tie, then a unique cheapest encodation, otherwise C40.
fn end_of_data_choice(costs: &Costs) -> Encodation {
    let rounded = costs.rounded();
    let min = min_of(&rounded);
    if rounded[Encodation::Ascii as usize] == min {
        return Encodation::Ascii;
    }
    let mut cheapest = ENCODATIONS.iter().filter(|&&e| rounded[e as usize] == min);
    match (cheapest.next(), cheapest.next()) {
        (Some(&e), None) => e,
        _ => Encodation::C40,
    }
}
