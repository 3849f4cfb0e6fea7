//! Algorithm selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

/// The admission algorithm a controller is bound to for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Counter reset at aligned, non-overlapping boundaries
    Fixed,
    /// Exact timestamps within a trailing interval
    Sliding,
}

impl Strategy {
    /// The configuration name of this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Fixed => "fixed",
            Strategy::Sliding => "sliding",
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Strategy::Fixed),
            "sliding" => Ok(Strategy::Sliding),
            _ => Err(ConfigurationError::UnknownStrategy(name.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
