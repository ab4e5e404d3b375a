use crate::codec::HighLevelEncoding;
use crate::metadata::{SymbolInfo, SymbolSize};

// Data Matrix codewords
//------------------------------------------------------------------------------

/// Padded data codewords of a Data Matrix symbol together with the symbol
/// they were sized for.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DataMatrix {
    codewords: Vec<u8>,
    data_len: usize,
    symbol: &'static SymbolInfo,
}

impl DataMatrix {
    pub(crate) fn new(encoding: HighLevelEncoding) -> Self {
        let HighLevelEncoding { codewords, data_len, symbol } = encoding;
        debug_assert!(
            codewords.len() == symbol.data_capacity(),
            "Codeword count {} doesn't match symbol capacity {}",
            codewords.len(),
            symbol.data_capacity()
        );
        Self { codewords, data_len, symbol }
    }

    pub fn codewords(&self) -> &[u8] {
        &self.codewords
    }

    /// Number of codewords carrying data, excluding padding.
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    pub fn symbol(&self) -> &'static SymbolInfo {
        self.symbol
    }

    pub fn size(&self) -> SymbolSize {
        self.symbol.size()
    }

    /// Splits the codewords into the symbol's interleaved Reed-Solomon blocks.
    /// Codeword `i` belongs to block `i % block_count`.
    pub fn data_blocks(&self) -> Vec<Vec<u8>> {
        let block_count = self.symbol.interleaved_block_count();
        let mut blocks: Vec<Vec<u8>> = (0..block_count)
            .map(|i| Vec::with_capacity(self.symbol.data_length_for_interleaved_block(i)))
            .collect();
        for (i, &cw) in self.codewords.iter().enumerate() {
            blocks[i % block_count].push(cw);
        }
        blocks
    }

    pub fn metadata(&self) -> String {
        format!(
            "{{ Size: {}, Data: {}/{} codewords, Error codewords: {} }}",
            self.size(),
            self.data_len,
            self.symbol.data_capacity(),
            self.symbol.error_codewords()
        )
    }
}

#[cfg(test)]
mod datamatrix_tests {
    use crate::builder::DMBuilder;
    use crate::metadata::{SymbolShape, SymbolSize};

    #[test]
    fn test_metadata() {
        let dm = DMBuilder::new(b"123456").build().unwrap();
        assert_eq!(dm.metadata(), "{ Size: 10x10, Data: 3/3 codewords, Error codewords: 5 }");
    }

    #[test]
    fn test_single_block() {
        let dm = DMBuilder::new(b"AIMAIAB").build().unwrap();
        assert_eq!(dm.data_blocks(), vec![dm.codewords().to_vec()]);
    }

    #[test]
    fn test_interleaved_blocks() {
        let dm = DMBuilder::new(b"A")
            .shape(SymbolShape::Square)
            .min_size(SymbolSize::new(144, 144))
            .build()
            .unwrap();
        assert_eq!(dm.codewords().len(), 1558);
        let blocks = dm.data_blocks();
        assert_eq!(blocks.len(), 10);
        assert!(blocks[..8].iter().all(|b| b.len() == 156));
        assert!(blocks[8..].iter().all(|b| b.len() == 155));
        assert_eq!(blocks[0][0], 66);
        assert_eq!(blocks[1][0], 129);
        assert_eq!(blocks[3][1], dm.codewords()[13]);
    }
}
