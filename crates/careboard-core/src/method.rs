use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP-like method used to select a resolver for a resource key.
///
/// Reads go through [`Method::Get`], writes through [`Method::Post`]. The
/// method is one half of the composite resolver key; resource keys never
/// encode it as a string prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}
