//! Site identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// USGS gauge sites on the Guadalupe River, TX
pub const DEFAULT_SITES: [&str; 4] = [
    "08166200", // Guadalupe River at Kerrville, TX
    "08168500", // Guadalupe River at Comfort, TX
    "08171000", // Guadalupe River at Spring Branch, TX
    "08176500", // Guadalupe River at New Braunfels, TX
];

/// Opaque identifier of a monitored gauge site
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label used when upstream has no name for the site
    pub fn fallback_name(&self) -> String {
        format!("Site {}", self.0)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SiteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SiteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SiteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The built-in site list
pub fn default_sites() -> Vec<SiteId> {
    DEFAULT_SITES.iter().copied().map(SiteId::from).collect()
}
