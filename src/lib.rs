//! # dmism
//!
//! A Rust library for the high-level encodation stage of Data Matrix (ECC 200) symbols.
//! Turns a message into the data codeword stream of the smallest symbol that holds it,
//! switching between the six Data Matrix encodations as the message goes.
//!
//! ## Features
//!
//! - **Six encodations**: ASCII (with digit pairs), C40, Text, ANSI X12, EDIFACT and Base256
//! - **Lookahead**: ISO/IEC 16022 Annex P lookahead decides where to latch and unlatch
//! - **Symbol sizing**: Picks the smallest square or rectangular symbol, optionally bounded in size
//! - **Macros and ECI**: Macro 05/06 compaction and ECI character set announcement
//! - **Forced encodation**: Start a message in a chosen encodation
//!
//! ## Quick Start
//!
//! ```rust
//! use dmism::DMBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Simplest usage - provide only data, the smallest fitting symbol is picked
//! let dm = DMBuilder::new(b"AIMAIMAIM").build()?;
//!
//! assert_eq!(dm.codewords(), &[230, 91, 11, 91, 11, 91, 11, 254]);
//! println!("{}", dm.metadata());
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use dmism::{DMBuilder, Encodation, SymbolShape, SymbolSize};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dm = DMBuilder::from_text("Grüße aus Köln")
//!     .shape(SymbolShape::Square)            // Square or rectangular symbols - defaults to either
//!     .min_size(SymbolSize::new(16, 16))     // Smallest symbol allowed, in modules
//!     .max_size(SymbolSize::new(48, 48))     // Largest symbol allowed, in modules
//!     .encodation(Encodation::Text)          // Start in Text encodation
//!     .charset(encoding_rs::UTF_8)           // Transcode into UTF-8 and announce it with an ECI
//!     .build()?;
//!
//! assert_eq!(dm.codewords().len(), dm.symbol().data_capacity());
//! # Ok(())
//! # }
//! ```
//!
//! ## Encodations
//!
//! - **ASCII**: One codeword per character, two digits per codeword
//! - **C40**: Three uppercase letters, digits or spaces per two codewords
//! - **Text**: As C40 with lowercase letters in the basic set
//! - **X12**: The ANSI X12 EDI character set, three characters per two codewords
//! - **EDIFACT**: Printable ASCII 32 to 94, four characters per three codewords
//! - **Base256**: Any byte, one codeword each after a length field
//!
//! Text messages are read as ISO-8859-1 unless a character set is selected. Characters
//! outside it are rejected with [`DMError::InvalidChar`].

pub mod builder;
pub(crate) mod common;

pub use builder::{DMBuilder, DataMatrix};
pub use common::codec::{
    eci_designator, encode_high_level, pack_triplet, randomize_253, randomize_255,
    unpack_triplet, unrandomize_255, EncodeOptions, Encodation, HighLevelEncoding,
};
pub use common::metadata::{SymbolConstraints, SymbolInfo, SymbolShape, SymbolSize, SYMBOLS};
pub use common::utils::{DMError, DMResult};
pub(crate) use common::*;
