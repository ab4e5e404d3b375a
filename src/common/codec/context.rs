use log::trace;

use super::types::{is_digit, is_extended_ascii, Checkpoint, Encodation, UnitBuffer};
use crate::metadata::{SymbolConstraints, SymbolInfo};
use crate::utils::{DMError, DMResult};

// Encoder context
//------------------------------------------------------------------------------

/// Mutable state shared by the encodation routines: the message, the cursor,
/// the codewords written so far and the symbol those codewords fit in.
#[derive(Debug)]
pub struct EncoderContext<'a> {
    msg: &'a [u8],
    pos: usize,
    skip_at_end: usize,
    codewords: Vec<u8>,
    new_encodation: Option<Encodation>,
    constraints: SymbolConstraints,
    symbol_info: Option<&'static SymbolInfo>,
}

impl<'a> EncoderContext<'a> {
    pub fn new(msg: &'a [u8], constraints: SymbolConstraints) -> Self {
        Self {
            msg,
            pos: 0,
            skip_at_end: 0,
            codewords: Vec::with_capacity(msg.len() + 8),
            new_encodation: None,
            constraints,
            symbol_info: None,
        }
    }

    /// Portion of the message still subject to encodation. Excludes a macro
    /// trailer implied by the macro codeword.
    pub fn message(&self) -> &'a [u8] {
        &self.msg[..self.total_len()]
    }

    fn total_len(&self) -> usize {
        self.msg.len().saturating_sub(self.skip_at_end)
    }

    pub fn set_skip_at_end(&mut self, count: usize) {
        self.skip_at_end = count;
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn has_more_characters(&self) -> bool {
        self.pos < self.total_len()
    }

    pub fn remaining_characters(&self) -> usize {
        self.total_len().saturating_sub(self.pos)
    }

    pub fn current_char(&self) -> DMResult<u8> {
        if !self.has_more_characters() {
            return Err(DMError::PositionOutOfRange(self.pos));
        }
        Ok(self.msg[self.pos])
    }

    /// Character `offset` places after the cursor, if it is still part of the
    /// message.
    pub fn peek(&self, offset: usize) -> Option<u8> {
        self.message().get(self.pos + offset).copied()
    }

    /// Returns the current character and moves past it.
    pub fn next_char(&mut self) -> DMResult<u8> {
        let ch = self.current_char()?;
        self.pos += 1;
        Ok(ch)
    }

    pub fn advance_by(&mut self, count: usize) -> DMResult<()> {
        if count > self.remaining_characters() {
            return Err(DMError::PositionOutOfRange(self.pos + count));
        }
        self.pos += count;
        Ok(())
    }

    pub fn retreat_by(&mut self, count: usize) -> DMResult<()> {
        if count > self.pos {
            return Err(DMError::Internal("Cannot backtrack past the start of the message"));
        }
        self.pos -= count;
        Ok(())
    }

    pub fn checkpoint(&self, buffer: &UnitBuffer) -> Checkpoint {
        buffer.checkpoint(self.pos)
    }

    /// Restores the cursor and buffer to a checkpoint and drops the cached
    /// symbol.
    pub fn rollback(&mut self, buffer: &mut UnitBuffer, cp: &Checkpoint) {
        trace!("Rolling back from {} to {}", self.pos, cp.pos);
        buffer.rollback(cp);
        self.pos = cp.pos;
        self.reset_symbol_info();
    }

    /// Number of ASCII codewords the rest of the message would take.
    pub fn remaining_ascii_cost(&self) -> usize {
        let rest = &self.message()[self.pos.min(self.total_len())..];
        let mut cost = 0;
        let mut i = 0;
        while i < rest.len() {
            if i + 1 < rest.len() && is_digit(rest[i]) && is_digit(rest[i + 1]) {
                i += 2;
                cost += 1;
                continue;
            }
            cost += if is_extended_ascii(rest[i]) { 2 } else { 1 };
            i += 1;
        }
        cost
    }

    // Codewords
    //--------------------------------------------------------------------------

    pub fn write_codeword(&mut self, codeword: u8) -> DMResult<()> {
        self.codewords.push(codeword);
        self.commit()
    }

    pub fn write_codewords(&mut self, codewords: &[u8]) -> DMResult<()> {
        self.codewords.extend_from_slice(codewords);
        self.commit()
    }

    // Every write must still fit in some allowed symbol.
    fn commit(&mut self) -> DMResult<()> {
        self.symbol_info = None;
        self.refresh_symbol_info().map(|_| ())
    }

    pub fn codeword_count(&self) -> usize {
        self.codewords.len()
    }

    #[cfg(test)]
    pub fn codewords(&self) -> &[u8] {
        &self.codewords
    }

    pub fn into_codewords(self) -> Vec<u8> {
        self.codewords
    }

    // Symbol info
    //--------------------------------------------------------------------------

    /// Makes sure the cached symbol holds `count` codewords, resolving a
    /// bigger one otherwise. A symbol large enough is kept as is.
    pub fn update_symbol_info(&mut self, count: usize) -> DMResult<&'static SymbolInfo> {
        match self.symbol_info {
            Some(info) if count <= info.data_capacity() => Ok(info),
            _ => {
                let info = self.constraints.resolve(count)?;
                self.symbol_info = Some(info);
                Ok(info)
            }
        }
    }

    pub fn refresh_symbol_info(&mut self) -> DMResult<&'static SymbolInfo> {
        self.update_symbol_info(self.codewords.len())
    }

    pub fn reset_symbol_info(&mut self) {
        self.symbol_info = None;
    }

    #[cfg(test)]
    pub fn symbol_info(&self) -> Option<&'static SymbolInfo> {
        self.symbol_info
    }

    /// Free data codewords left once `count` codewords are in the symbol.
    pub fn available(&mut self, count: usize) -> DMResult<usize> {
        Ok(self.update_symbol_info(count)?.data_capacity() - count)
    }

    // Encodation switching
    //--------------------------------------------------------------------------

    pub fn signal_encoder_change(&mut self, encodation: Encodation) {
        self.new_encodation = Some(encodation);
    }

    pub fn new_encodation(&self) -> Option<Encodation> {
        self.new_encodation
    }

    pub fn take_encoder_signal(&mut self) -> Option<Encodation> {
        self.new_encodation.take()
    }
}

#[cfg(test)]
mod context_tests {
    use super::EncoderContext;
    use crate::codec::{Encodation, UnitBuffer};
    use crate::metadata::{SymbolConstraints, SymbolShape};
    use crate::utils::DMError;

    fn ctx(msg: &[u8]) -> EncoderContext<'_> {
        EncoderContext::new(msg, SymbolConstraints::default())
    }

    #[test]
    fn test_cursor() {
        let mut ctx = ctx(b"AB");
        assert_eq!(ctx.current_char(), Ok(b'A'));
        assert_eq!(ctx.next_char(), Ok(b'A'));
        assert_eq!(ctx.peek(0), Some(b'B'));
        assert_eq!(ctx.peek(1), None);
        ctx.advance_by(1).unwrap();
        assert!(!ctx.has_more_characters());
        assert_eq!(ctx.current_char(), Err(DMError::PositionOutOfRange(2)));
        assert_eq!(ctx.advance_by(1), Err(DMError::PositionOutOfRange(3)));
        ctx.retreat_by(2).unwrap();
        assert_eq!(ctx.pos(), 0);
        assert!(matches!(ctx.retreat_by(1), Err(DMError::Internal(_))));
    }

    #[test]
    fn test_skip_at_end() {
        let mut ctx = ctx(b"ABC\x1E\x04");
        ctx.set_skip_at_end(2);
        assert_eq!(ctx.message(), b"ABC");
        assert_eq!(ctx.remaining_characters(), 3);
    }

    #[test]
    fn test_remaining_ascii_cost() {
        assert_eq!(ctx(b"").remaining_ascii_cost(), 0);
        assert_eq!(ctx(b"12").remaining_ascii_cost(), 1);
        assert_eq!(ctx(b"123").remaining_ascii_cost(), 2);
        assert_eq!(ctx(b"A\xEB").remaining_ascii_cost(), 3);
    }

    #[test]
    fn test_write_resolves_symbol() {
        let mut ctx = ctx(b"");
        ctx.write_codewords(&[1, 2, 3, 4]).unwrap();
        assert_eq!(ctx.symbol_info().map(|s| s.data_capacity()), Some(5));
        ctx.write_codeword(5).unwrap();
        ctx.write_codeword(6).unwrap();
        assert_eq!(ctx.symbol_info().map(|s| s.data_capacity()), Some(8));
        assert_eq!(ctx.codeword_count(), 6);
    }

    #[test]
    fn test_update_keeps_larger_symbol() {
        let mut ctx = ctx(b"");
        assert_eq!(ctx.update_symbol_info(9).unwrap().data_capacity(), 10);
        assert_eq!(ctx.update_symbol_info(2).unwrap().data_capacity(), 10);
        assert_eq!(ctx.available(7).unwrap(), 3);
        ctx.reset_symbol_info();
        assert_eq!(ctx.update_symbol_info(2).unwrap().data_capacity(), 3);
    }

    #[test]
    fn test_write_beyond_capacity() {
        let constraints = SymbolConstraints::new(SymbolShape::Square, None, None).unwrap();
        let mut ctx = EncoderContext::new(b"", constraints);
        let data = vec![0u8; 1559];
        assert_eq!(ctx.write_codewords(&data), Err(DMError::DataTooLong { codewords: 1559 }));
    }

    #[test]
    fn test_rollback() {
        let mut ctx = ctx(b"ABCD");
        let mut buf = UnitBuffer::new();
        let cp = ctx.checkpoint(&buf);
        buf.push_value(14);
        ctx.next_char().unwrap();
        ctx.rollback(&mut buf, &cp);
        assert_eq!(ctx.pos(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_encoder_signal() {
        let mut ctx = ctx(b"A");
        assert_eq!(ctx.take_encoder_signal(), None);
        ctx.signal_encoder_change(Encodation::C40);
        assert_eq!(ctx.new_encodation(), Some(Encodation::C40));
        assert_eq!(ctx.take_encoder_signal(), Some(Encodation::C40));
        assert_eq!(ctx.new_encodation(), None);
    }
}
