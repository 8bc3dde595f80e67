//! The symbol a single engine instance is bound to.
//!
//! Each engine binds to exactly one tradable instrument; routing across
//! multiple symbols is an external collaborator's job. A thin newtype
//! rather than a pair-of-assets model, since cross-asset composition is
//! out of scope here.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol must be non-empty")]
    Empty,
}

impl Symbol {
    pub fn new(raw: impl Into<String>) -> Result<Self, SymbolError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SymbolError::Empty);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Symbol> for String {
    fn from(sym: Symbol) -> Self {
        sym.0
    }
}
