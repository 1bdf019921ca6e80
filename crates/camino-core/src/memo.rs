//! Memo handling for base transactions
//!
//! A memo is an opaque byte string carried length-prefixed in every base
//! transaction. Text memos reject control characters.

use crate::codec::{Reader, Wire, Writer};
use crate::{Error, Result};

/// Maximum memo length in bytes
pub const MAX_MEMO_LENGTH: usize = 256;

/// Memo length past which callers should warn before the hard limit
pub const MEMO_WARNING_LENGTH: usize = 200;

/// Memo types
///
/// Memos compare by their bytes, so a decoded text memo equals the original.
#[derive(Debug, Default, Clone)]
pub enum Memo {
    /// Empty memo (no data)
    #[default]
    Empty,
    /// Text memo (UTF-8 string)
    Text(String),
    /// Arbitrary bytes
    Arbitrary(Vec<u8>),
}

impl Memo {
    /// Create text memo with strict validation
    pub fn from_text(text: String) -> Result<Self> {
        if text.is_empty() {
            return Ok(Memo::Empty);
        }

        if !Self::is_valid_memo_text(&text) {
            return Err(Error::InvalidTransaction(
                "Memo contains invalid characters (control characters not allowed)".to_string(),
            ));
        }

        if text.len() > MAX_MEMO_LENGTH {
            return Err(Error::MemoTooLong(format!(
                "Memo is {} bytes, maximum is {} bytes",
                text.len(),
                MAX_MEMO_LENGTH
            )));
        }

        Ok(Memo::Text(text))
    }

    /// Allows printable characters, newline, tab and carriage return
    fn is_valid_memo_text(text: &str) -> bool {
        text.chars()
            .all(|c| c == '\n' || c == '\t' || c == '\r' || !c.is_control())
    }

    /// Create text memo, truncating at a UTF-8 boundary if too long
    pub fn from_text_truncated(text: &str) -> Self {
        let mut out = String::new();
        for c in text
            .chars()
            .filter(|c| *c == '\n' || *c == '\t' || *c == '\r' || !c.is_control())
        {
            if out.len() + c.len_utf8() > MAX_MEMO_LENGTH {
                break;
            }
            out.push(c);
        }
        if out.is_empty() {
            Memo::Empty
        } else {
            Memo::Text(out)
        }
    }

    /// Create from arbitrary bytes
    pub fn from_raw(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Memo::Empty);
        }
        if bytes.len() > MAX_MEMO_LENGTH {
            return Err(Error::MemoTooLong(format!(
                "Memo length {} exceeds maximum {}",
                bytes.len(),
                MAX_MEMO_LENGTH
            )));
        }
        Ok(Memo::Arbitrary(bytes))
    }

    /// Raw memo bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Memo::Empty => &[],
            Memo::Text(text) => text.as_bytes(),
            Memo::Arbitrary(bytes) => bytes,
        }
    }

    /// Byte length
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Check if memo is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get remaining bytes available in memo
    pub fn remaining_bytes(&self) -> usize {
        MAX_MEMO_LENGTH.saturating_sub(self.len())
    }

    /// Check if memo is approaching length limit
    pub fn is_near_limit(&self) -> bool {
        self.len() > MEMO_WARNING_LENGTH
    }

    /// Get as string (if text memo)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Memo::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Validate memo
    pub fn validate(&self) -> Result<()> {
        if self.len() > MAX_MEMO_LENGTH {
            return Err(Error::MemoTooLong(format!(
                "Memo length {} exceeds maximum {}",
                self.len(),
                MAX_MEMO_LENGTH
            )));
        }
        Ok(())
    }
}

impl Wire for Memo {
    fn write(&self, w: &mut Writer) {
        w.put_blob(self.as_bytes());
    }

    /// Decoded memos are kept as bytes so re-encoding is exact
    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let bytes = r.read_blob()?;
        if bytes.len() > MAX_MEMO_LENGTH {
            return Err(Error::Decode(format!(
                "memo of {} bytes exceeds {}",
                bytes.len(),
                MAX_MEMO_LENGTH
            )));
        }
        Memo::from_raw(bytes)
    }
}

impl PartialEq for Memo {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Memo {}

impl std::hash::Hash for Memo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl TryFrom<&str> for Memo {
    type Error = Error;

    fn try_from(text: &str) -> Result<Self> {
        Memo::from_text(text.to_string())
    }
}
