//! Machine word and its printable forms
//!
//! Every expression evaluates to a single unsigned word of the simulated core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Native word of the simulated processor, used for values and addresses
pub type Word = u32;

/// Width in bytes of one word read by a dereference
pub const WORD_BYTES: usize = std::mem::size_of::<Word>();

/// How a result is rendered back to the user
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Unsigned decimal: `p expr`
    #[default]
    Decimal,
    /// Zero-padded hex: `p/x expr`
    Hex,
}

impl Format {
    pub fn apply(self, value: Word) -> Formatted {
        Formatted {
            value,
            format: self,
        }
    }
}

/// A word paired with the format it should be shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatted {
    pub value: Word,
    pub format: Format,
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            Format::Decimal => write!(f, "{}", self.value),
            Format::Hex => write!(f, "{:#010x}", self.value),
        }
    }
}
