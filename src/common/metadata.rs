use std::fmt::{Display, Formatter};

use crate::utils::{DMError, DMResult};

// Symbol shape
//------------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum SymbolShape {
    #[default]
    Any,
    Square,
    Rectangle,
}

impl SymbolShape {
    fn allows(&self, symbol: &SymbolInfo) -> bool {
        match self {
            Self::Any => true,
            Self::Square => !symbol.rectangular,
            Self::Rectangle => symbol.rectangular,
        }
    }
}

// Symbol size
//------------------------------------------------------------------------------

/// Symbol dimension in modules, including the finder and timing patterns.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct SymbolSize {
    pub width: usize,
    pub height: usize,
}

impl SymbolSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

impl Display for SymbolSize {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// Symbol info
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    rectangular: bool,
    data_capacity: usize,
    error_codewords: usize,
    matrix_width: usize,
    matrix_height: usize,
    data_regions: usize,
    rs_block_data: usize,
    rs_block_error: usize,
}

impl SymbolInfo {
    const fn new(
        rectangular: bool,
        data_capacity: usize,
        error_codewords: usize,
        matrix_width: usize,
        matrix_height: usize,
        data_regions: usize,
    ) -> Self {
        Self::interleaved(
            rectangular,
            data_capacity,
            error_codewords,
            matrix_width,
            matrix_height,
            data_regions,
            data_capacity,
            error_codewords,
        )
    }

    #[allow(clippy::too_many_arguments)]
    const fn interleaved(
        rectangular: bool,
        data_capacity: usize,
        error_codewords: usize,
        matrix_width: usize,
        matrix_height: usize,
        data_regions: usize,
        rs_block_data: usize,
        rs_block_error: usize,
    ) -> Self {
        Self {
            rectangular,
            data_capacity,
            error_codewords,
            matrix_width,
            matrix_height,
            data_regions,
            rs_block_data,
            rs_block_error,
        }
    }

    pub fn is_rectangular(&self) -> bool {
        self.rectangular
    }

    pub fn data_capacity(&self) -> usize {
        self.data_capacity
    }

    pub fn error_codewords(&self) -> usize {
        self.error_codewords
    }

    pub fn matrix_width(&self) -> usize {
        self.matrix_width
    }

    pub fn matrix_height(&self) -> usize {
        self.matrix_height
    }

    pub fn horizontal_data_regions(&self) -> usize {
        match self.data_regions {
            1 => 1,
            2 | 4 => 2,
            16 => 4,
            36 => 6,
            _ => unreachable!("Invalid number of data regions: {}", self.data_regions),
        }
    }

    pub fn vertical_data_regions(&self) -> usize {
        match self.data_regions {
            1 | 2 => 1,
            4 => 2,
            16 => 4,
            36 => 6,
            _ => unreachable!("Invalid number of data regions: {}", self.data_regions),
        }
    }

    pub fn symbol_data_width(&self) -> usize {
        self.horizontal_data_regions() * self.matrix_width
    }

    pub fn symbol_data_height(&self) -> usize {
        self.vertical_data_regions() * self.matrix_height
    }

    pub fn symbol_width(&self) -> usize {
        self.symbol_data_width() + (self.horizontal_data_regions() << 1)
    }

    pub fn symbol_height(&self) -> usize {
        self.symbol_data_height() + (self.vertical_data_regions() << 1)
    }

    pub fn size(&self) -> SymbolSize {
        SymbolSize::new(self.symbol_width(), self.symbol_height())
    }

    pub fn codeword_count(&self) -> usize {
        self.data_capacity + self.error_codewords
    }

    // The 144x144 symbol is the only one whose blocks differ in size
    pub fn interleaved_block_count(&self) -> usize {
        if self.data_capacity == 1558 {
            10
        } else {
            self.data_capacity / self.rs_block_data
        }
    }

    /// Data codewords in the block at zero-based `index`.
    pub fn data_length_for_interleaved_block(&self, index: usize) -> usize {
        debug_assert!(index < self.interleaved_block_count(), "Invalid block index: {index}");
        if self.data_capacity == 1558 {
            if index < 8 {
                156
            } else {
                155
            }
        } else {
            self.rs_block_data
        }
    }

    pub fn error_length_for_interleaved_block(&self) -> usize {
        self.rs_block_error
    }
}

impl Display for SymbolInfo {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let shape = if self.rectangular { "Rectangular Symbol:" } else { "Square Symbol:" };
        write!(
            f,
            "{shape} data region {}x{}, symbol size {}x{}, symbol data size {}x{}, codewords {}+{}",
            self.matrix_width,
            self.matrix_height,
            self.symbol_width(),
            self.symbol_height(),
            self.symbol_data_width(),
            self.symbol_data_height(),
            self.data_capacity,
            self.error_codewords
        )
    }
}

// ECC 200 symbols ordered by data capacity
pub static SYMBOLS: [SymbolInfo; 30] = [
    SymbolInfo::new(false, 3, 5, 8, 8, 1),
    SymbolInfo::new(false, 5, 7, 10, 10, 1),
    SymbolInfo::new(true, 5, 7, 16, 6, 1),
    SymbolInfo::new(false, 8, 10, 12, 12, 1),
    SymbolInfo::new(true, 10, 11, 14, 6, 2),
    SymbolInfo::new(false, 12, 12, 14, 14, 1),
    SymbolInfo::new(true, 16, 14, 24, 10, 1),
    SymbolInfo::new(false, 18, 14, 16, 16, 1),
    SymbolInfo::new(false, 22, 18, 18, 18, 1),
    SymbolInfo::new(true, 22, 18, 16, 10, 2),
    SymbolInfo::new(false, 30, 20, 20, 20, 1),
    SymbolInfo::new(true, 32, 24, 16, 14, 2),
    SymbolInfo::new(false, 36, 24, 22, 22, 1),
    SymbolInfo::new(false, 44, 28, 24, 24, 1),
    SymbolInfo::new(true, 49, 28, 22, 14, 2),
    SymbolInfo::new(false, 62, 36, 14, 14, 4),
    SymbolInfo::new(false, 86, 42, 16, 16, 4),
    SymbolInfo::new(false, 114, 48, 18, 18, 4),
    SymbolInfo::new(false, 144, 56, 20, 20, 4),
    SymbolInfo::new(false, 174, 68, 22, 22, 4),
    SymbolInfo::interleaved(false, 204, 84, 24, 24, 4, 102, 42),
    SymbolInfo::interleaved(false, 280, 112, 14, 14, 16, 140, 56),
    SymbolInfo::interleaved(false, 368, 144, 16, 16, 16, 92, 36),
    SymbolInfo::interleaved(false, 456, 192, 18, 18, 16, 114, 48),
    SymbolInfo::interleaved(false, 576, 224, 20, 20, 16, 144, 56),
    SymbolInfo::interleaved(false, 696, 272, 22, 22, 16, 174, 68),
    SymbolInfo::interleaved(false, 816, 336, 24, 24, 16, 136, 56),
    SymbolInfo::interleaved(false, 1050, 408, 18, 18, 36, 175, 68),
    SymbolInfo::interleaved(false, 1304, 496, 20, 20, 36, 163, 62),
    SymbolInfo::interleaved(false, 1558, 620, 22, 22, 36, 156, 62),
];

// Symbol constraints
//------------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub struct SymbolConstraints {
    pub shape: SymbolShape,
    pub min_size: Option<SymbolSize>,
    pub max_size: Option<SymbolSize>,
}

impl SymbolConstraints {
    pub fn new(
        shape: SymbolShape,
        min_size: Option<SymbolSize>,
        max_size: Option<SymbolSize>,
    ) -> DMResult<Self> {
        if let Some(SymbolSize { width, height }) = min_size {
            if width == 0 || height == 0 {
                return Err(DMError::InvalidSizeConstraint);
            }
        }
        if let (Some(min), Some(max)) = (min_size, max_size) {
            if min.width > max.width || min.height > max.height {
                return Err(DMError::InvalidSizeConstraint);
            }
        }
        Ok(Self { shape, min_size, max_size })
    }

    fn allows(&self, symbol: &SymbolInfo) -> bool {
        if !self.shape.allows(symbol) {
            return false;
        }
        if let Some(min) = self.min_size {
            if symbol.symbol_width() < min.width || symbol.symbol_height() < min.height {
                return false;
            }
        }
        if let Some(max) = self.max_size {
            if symbol.symbol_width() > max.width || symbol.symbol_height() > max.height {
                return false;
            }
        }
        true
    }

    /// Smallest allowed symbol holding `codewords` data codewords.
    pub fn resolve(&self, codewords: usize) -> DMResult<&'static SymbolInfo> {
        SYMBOLS
            .iter()
            .filter(|s| self.allows(s))
            .find(|s| codewords <= s.data_capacity)
            .ok_or(DMError::DataTooLong { codewords })
    }

    pub fn max_capacity(&self) -> Option<usize> {
        SYMBOLS.iter().filter(|s| self.allows(s)).map(|s| s.data_capacity).max()
    }
}
