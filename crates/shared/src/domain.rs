use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! token_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            pub fn next(self) -> Self {
                Self(self.0.wrapping_add(1))
            }
        }
    };
}

token_newtype!(NetsRevision);
token_newtype!(SelectionEpoch);

/// Engine-assigned primitive identifier. The engine emits either integers or
/// strings; the two forms never compare equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimitiveId {
    Int(i64),
    Text(String),
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveId::Int(id) => write!(f, "{id}"),
            PrimitiveId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for PrimitiveId {
    fn from(value: i64) -> Self {
        PrimitiveId::Int(value)
    }
}

impl From<&str> for PrimitiveId {
    fn from(value: &str) -> Self {
        PrimitiveId::Text(value.to_string())
    }
}

impl PrimitiveId {
    /// Parses operator input: all-digit text becomes an integer id.
    pub fn parse_input(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<i64>() {
            Ok(id) => Some(PrimitiveId::Int(id)),
            Err(_) => Some(PrimitiveId::Text(raw.to_string())),
        }
    }
}
