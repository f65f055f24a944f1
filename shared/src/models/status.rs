//! Alert status derived from the physical trigger inputs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported to the mobile client for a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteStatus {
    Normal,
    Rising,
    Critical,
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SiteStatus::Normal => "NORMAL",
            SiteStatus::Rising => "RISING",
            SiteStatus::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// State of the low/high water triggers at a site.
///
/// Both triggers read false until the float switches are wired in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    pub low: bool,
    pub high: bool,
}

impl TriggerState {
    pub fn status(&self) -> SiteStatus {
        derive_status(self.low, self.high)
    }
}

/// High trigger wins over low; neither means normal
pub fn derive_status(low_triggered: bool, high_triggered: bool) -> SiteStatus {
    if high_triggered {
        SiteStatus::Critical
    } else if low_triggered {
        SiteStatus::Rising
    } else {
        SiteStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_status_truth_table() {
        assert_eq!(derive_status(false, false), SiteStatus::Normal);
        assert_eq!(derive_status(true, false), SiteStatus::Rising);
        assert_eq!(derive_status(false, true), SiteStatus::Critical);
        assert_eq!(derive_status(true, true), SiteStatus::Critical);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(SiteStatus::Critical).unwrap(),
            serde_json::json!("CRITICAL")
        );
        assert_eq!(SiteStatus::Rising.to_string(), "RISING");
    }

    #[test]
    fn test_default_triggers_are_normal() {
        assert_eq!(TriggerState::default().status(), SiteStatus::Normal);
    }

    proptest! {
        #[test]
        fn prop_high_trigger_always_critical(low in any::<bool>()) {
            prop_assert_eq!(derive_status(low, true), SiteStatus::Critical);
        }
    }
}
