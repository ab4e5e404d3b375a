mod datamatrix;

pub use datamatrix::DataMatrix;

use encoding_rs::{EncoderResult, Encoding};
use log::debug;

use crate::common::{
    codec::{encode_high_level, Encodation, EncodeOptions},
    metadata::{SymbolConstraints, SymbolShape, SymbolSize},
    utils::{DMError, DMResult},
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Payload<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
}

pub struct DMBuilder<'a> {
    payload: Payload<'a>,
    shape: SymbolShape,
    min_size: Option<SymbolSize>,
    max_size: Option<SymbolSize>,
    encodation: Option<Encodation>,
    charset: Option<&'static Encoding>,
}

impl<'a> DMBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_payload(Payload::Bytes(data))
    }

    /// Text is encoded as ISO-8859-1 unless a character set is selected.
    pub fn from_text(text: &'a str) -> Self {
        Self::with_payload(Payload::Text(text))
    }

    fn with_payload(payload: Payload<'a>) -> Self {
        Self {
            payload,
            shape: SymbolShape::Any,
            min_size: None,
            max_size: None,
            encodation: None,
            charset: None,
        }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.payload = Payload::Bytes(data);
        self
    }

    pub fn text(&mut self, text: &'a str) -> &mut Self {
        self.payload = Payload::Text(text);
        self
    }

    pub fn shape(&mut self, shape: SymbolShape) -> &mut Self {
        self.shape = shape;
        self
    }

    pub fn min_size(&mut self, size: SymbolSize) -> &mut Self {
        self.min_size = Some(size);
        self
    }

    pub fn max_size(&mut self, size: SymbolSize) -> &mut Self {
        self.max_size = Some(size);
        self
    }

    pub fn unset_size_constraints(&mut self) -> &mut Self {
        self.min_size = None;
        self.max_size = None;
        self
    }

    /// Starts the message in `encodation` for as long as it can represent it.
    pub fn encodation(&mut self, encodation: Encodation) -> &mut Self {
        self.encodation = Some(encodation);
        self
    }

    pub fn unset_encodation(&mut self) -> &mut Self {
        self.encodation = None;
        self
    }

    /// Announces the character set with an ECI. Text is transcoded into it,
    /// raw bytes are assumed to be in it already.
    pub fn charset(&mut self, charset: &'static Encoding) -> &mut Self {
        self.charset = Some(charset);
        self
    }

    pub fn unset_charset(&mut self) -> &mut Self {
        self.charset = None;
        self
    }

    pub fn metadata(&self) -> String {
        let size = |s: Option<SymbolSize>| s.map_or("None".to_string(), |s| s.to_string());
        let encodation = self.encodation.map_or("None".to_string(), |e| e.to_string());
        let charset = self.charset.map_or("None", |c| c.name());
        format!(
            "{{ Shape: {:?}, Min size: {}, Max size: {}, Encodation: {}, Charset: {} }}",
            self.shape,
            size(self.min_size),
            size(self.max_size),
            encodation,
            charset
        )
    }
}


impl DMBuilder<'_> {
    pub fn build(&self) -> DMResult<DataMatrix> {
        debug!("Generating Data Matrix {}", self.metadata());

        let constraints = SymbolConstraints::new(self.shape, self.min_size, self.max_size)?;
        let eci = self.charset.map(eci_for_charset).transpose()?;

        let data = match self.payload {
            Payload::Bytes(data) => data.to_vec(),
            Payload::Text(text) => match self.charset {
                Some(charset) => transcode(text, charset)?,
                None => latin1(text)?,
            },
        };
        if data.is_empty() {
            return Err(DMError::EmptyData);
        }

        debug!("Encoding {} bytes...", data.len());
        let opts = EncodeOptions { constraints, forced: self.encodation, eci };
        let encoding = encode_high_level(&data, &opts)?;

        let capacity = encoding.symbol.data_capacity();
        debug!("Symbol: {}", encoding.symbol);
        debug!(
            "Data size: {}, Encoded size: {}, Fill: {}%",
            data.len(),
            encoding.data_len,
            encoding.data_len * 100 / capacity
        );

        Ok(DataMatrix::new(encoding))
    }
}

// Character sets
//------------------------------------------------------------------------------

fn latin1(text: &str) -> DMResult<Vec<u8>> {
    text.chars()
        .enumerate()
        .map(|(pos, ch)| u8::try_from(ch).map_err(|_| DMError::InvalidChar { pos, ch }))
        .collect()
}

fn transcode(text: &str, charset: &'static Encoding) -> DMResult<Vec<u8>> {
    let mut encoder = charset.new_encoder();
    let max_len = encoder
        .max_buffer_length_from_utf8_without_replacement(text.len())
        .ok_or(DMError::Internal("Transcoded length overflows"))?;
    let mut out = Vec::with_capacity(max_len);
    let (res, read) = encoder.encode_from_utf8_to_vec_without_replacement(text, &mut out, true);
    match res {
        EncoderResult::InputEmpty => Ok(out),
        EncoderResult::Unmappable(ch) => {
            let pos = text[..read].chars().count().saturating_sub(1);
            Err(DMError::InvalidChar { pos, ch })
        }
        EncoderResult::OutputFull => Err(DMError::Internal("Transcoding buffer too small")),
    }
}

/// ECI assignment number of a character set.
pub fn eci_for_charset(charset: &'static Encoding) -> DMResult<u32> {
    use encoding_rs::*;

    let table: [(&'static Encoding, u32); 21] = [
        (ISO_8859_2, 4),
        (ISO_8859_3, 5),
        (ISO_8859_4, 6),
        (ISO_8859_5, 7),
        (ISO_8859_6, 8),
        (ISO_8859_7, 9),
        (ISO_8859_8, 10),
        (ISO_8859_10, 12),
        (ISO_8859_13, 15),
        (ISO_8859_14, 16),
        (ISO_8859_15, 17),
        (ISO_8859_16, 18),
        (SHIFT_JIS, 20),
        (WINDOWS_1250, 21),
        (WINDOWS_1251, 22),
        (WINDOWS_1252, 23),
        (WINDOWS_1256, 24),
        (UTF_8, 26),
        (BIG5, 28),
        (GB18030, 29),
        (EUC_KR, 30),
    ];
    table
        .iter()
        .find(|(enc, _)| *enc == charset)
        .map(|&(_, eci)| eci)
        .ok_or(DMError::UnsupportedCharset(charset.name()))
}
