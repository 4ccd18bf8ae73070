//! Primitive decoding for expression data buffers
//!
//! Single-cell vectors store their values as a packed byte buffer. The
//! representation declared by the quantitation type determines how many bytes
//! each element occupies and how it is interpreted:
//!
//! | Representation | Width | Decoded as |
//! |----------------|-------|------------|
//! | `FLOAT` | 4 | IEEE-754 single precision |
//! | `DOUBLE` | 8 | IEEE-754 double precision |
//! | `INT` | 4 | signed 32-bit integer |
//! | `LONG` | 8 | signed 64-bit integer |
//! | `CHAR` | 2 | UTF-16 code unit |
//! | `BOOLEAN` | 1 | `0` is false, anything else is true |
//! | `STRING` | variable | NUL-terminated UTF-8 |
//!
//! All multi-byte values are big-endian, which is the layout of the persisted
//! vectors.

use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

/// Numeric (or textual) representation of the values in a data buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrimitiveType {
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// UTF-16 code unit
    Char,
    /// Single byte boolean
    Boolean,
    /// Variable-width string
    String,
}

impl PrimitiveType {
    /// Get the byte size per value, or `None` for variable-width representations
    pub fn size_in_bytes(&self) -> Option<usize> {
        match self {
            PrimitiveType::Float => Some(4),
            PrimitiveType::Double => Some(8),
            PrimitiveType::Int => Some(4),
            PrimitiveType::Long => Some(8),
            PrimitiveType::Char => Some(2),
            PrimitiveType::Boolean => Some(1),
            PrimitiveType::String => None,
        }
    }

    /// Get the byte size per value, failing for variable-width representations
    pub fn fixed_width(&self) -> Result<usize, CodecError> {
        self.size_in_bytes()
            .ok_or(CodecError::UnsupportedRepresentation(*self))
    }

    /// Whether values of this representation can encode a missing value
    ///
    /// Only floating point values can, using `NaN`. Every stored element of
    /// any other representation is a present value.
    pub fn has_missing_value(&self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }
}

/// Errors that can occur while decoding data buffers
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The representation is not fixed-width
    #[error("Unsupported representation {0:?}: values are not fixed-width")]
    UnsupportedRepresentation(PrimitiveType),

    /// The buffer does not hold a whole number of elements
    #[error("Invalid data length: {actual} bytes is not a multiple of {width}")]
    InvalidLength {
        /// Width of one element in bytes
        width: usize,
        /// Actual buffer length
        actual: usize,
    },

    /// String data is not valid UTF-8
    #[error("Invalid string data: {0}")]
    InvalidString(#[from] std::str::Utf8Error),

    /// String data is missing its final terminator
    #[error("Unterminated string data")]
    UnterminatedString,
}

/// Read-only typed view over a fixed-width data buffer
///
/// The view never copies the buffer; [`DataView::get`] decodes one element
/// at a time.
#[derive(Debug, Clone, Copy)]
pub struct DataView<'a> {
    representation: PrimitiveType,
    width: usize,
    bytes: &'a [u8],
}

impl<'a> DataView<'a> {
    /// Create a view over `bytes` interpreted as `representation`
    pub fn new(representation: PrimitiveType, bytes: &'a [u8]) -> Result<Self, CodecError> {
        let width = representation.fixed_width()?;
        if bytes.len() % width != 0 {
            return Err(CodecError::InvalidLength {
                width,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            representation,
            width,
            bytes,
        })
    }

    /// Representation of the underlying buffer
    pub fn representation(&self) -> PrimitiveType {
        self.representation
    }

    /// Number of elements in the view
    pub fn len(&self) -> usize {
        self.bytes.len() / self.width
    }

    /// Whether the view holds no element
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode element `index` as a double
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        let offset = index * self.width;
        let b = &self.bytes[offset..offset + self.width];
        match self.representation {
            PrimitiveType::Float => BigEndian::read_f32(b) as f64,
            PrimitiveType::Double => BigEndian::read_f64(b),
            PrimitiveType::Int => BigEndian::read_i32(b) as f64,
            PrimitiveType::Long => BigEndian::read_i64(b) as f64,
            PrimitiveType::Char => BigEndian::read_u16(b) as f64,
            PrimitiveType::Boolean => {
                if b[0] != 0 {
                    1.0
                } else {
                    0.0
                }
            }
            // rejected by DataView::new
            PrimitiveType::String => f64::NAN,
        }
    }

    /// Raw bytes backing the elements in `range`
    pub fn element_bytes(&self, range: Range<usize>) -> &'a [u8] {
        &self.bytes[range.start * self.width..range.end * self.width]
    }

    /// Decode the elements in `range`
    pub fn range_to_vec(&self, range: Range<usize>) -> Vec<f64> {
        range.map(|i| self.get(i)).collect()
    }

    /// Decode every element
    pub fn to_vec(&self) -> Vec<f64> {
        self.range_to_vec(0..self.len())
    }
}

/// Encode 32-bit floats
pub fn encode_floats(values: &[f32]) -> Vec<u8> {
    let mut buf = vec![0u8; values.len() * 4];
    BigEndian::write_f32_into(values, &mut buf);
    buf
}

/// Encode 64-bit floats
pub fn encode_doubles(values: &[f64]) -> Vec<u8> {
    let mut buf = vec![0u8; values.len() * 8];
    BigEndian::write_f64_into(values, &mut buf);
    buf
}

/// Encode 32-bit integers
pub fn encode_ints(values: &[i32]) -> Vec<u8> {
    let mut buf = vec![0u8; values.len() * 4];
    BigEndian::write_i32_into(values, &mut buf);
    buf
}

/// Encode 64-bit integers
pub fn encode_longs(values: &[i64]) -> Vec<u8> {
    let mut buf = vec![0u8; values.len() * 8];
    BigEndian::write_i64_into(values, &mut buf);
    buf
}

/// Encode UTF-16 code units
pub fn encode_chars(values: &[u16]) -> Vec<u8> {
    let mut buf = vec![0u8; values.len() * 2];
    BigEndian::write_u16_into(values, &mut buf);
    buf
}

/// Encode booleans, one byte each
pub fn encode_booleans(values: &[bool]) -> Vec<u8> {
    values.iter().map(|&b| u8::from(b)).collect()
}

/// Encode strings as NUL-terminated UTF-8
///
/// Strings containing a NUL byte cannot be represented and are truncated at
/// their first NUL on decoding.
pub fn encode_strings<S: AsRef<str>>(values: &[S]) -> Vec<u8> {
    let mut buf = Vec::new();
    for value in values {
        buf.extend_from_slice(value.as_ref().as_bytes());
        buf.push(0);
    }
    buf
}

/// Decode NUL-terminated UTF-8 strings
pub fn decode_strings(bytes: &[u8]) -> Result<Vec<String>, CodecError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    if bytes.last() != Some(&0) {
        return Err(CodecError::UnterminatedString);
    }
    bytes[..bytes.len() - 1]
        .split(|&b| b == 0)
        .map(|s| Ok(std::str::from_utf8(s)?.to_string()))
        .collect()
}

/// Decode a fixed-width buffer into doubles
pub fn decode(representation: PrimitiveType, bytes: &[u8]) -> Result<Vec<f64>, CodecError> {
    Ok(DataView::new(representation, bytes)?.to_vec())
}
