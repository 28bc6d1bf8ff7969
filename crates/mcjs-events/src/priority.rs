use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Handler priority tier
///
/// Tiers run from `Lowest` to `Monitor`. Handlers in the `Monitor` tier observe
/// the final outcome and should not change the event's suppressed state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventPriority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
    Monitor,
}

impl EventPriority {
    /// All tiers in execution order
    pub const ALL: [EventPriority; 6] = [
        EventPriority::Lowest,
        EventPriority::Low,
        EventPriority::Normal,
        EventPriority::High,
        EventPriority::Highest,
        EventPriority::Monitor,
    ];

    /// Whether handlers at this tier may change the suppressed flag
    pub fn may_suppress(self) -> bool {
        self != EventPriority::Monitor
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventPriority::Lowest => "LOWEST",
            EventPriority::Low => "LOW",
            EventPriority::Normal => "NORMAL",
            EventPriority::High => "HIGH",
            EventPriority::Highest => "HIGHEST",
            EventPriority::Monitor => "MONITOR",
        }
    }
}

impl fmt::Display for EventPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for priority names that match no tier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown event priority '{0}'")]
pub struct UnknownPriority(pub String);

impl FromStr for EventPriority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventPriority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPriority(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order() {
        assert!(EventPriority::Lowest < EventPriority::Low);
        assert!(EventPriority::Normal < EventPriority::High);
        assert!(EventPriority::Highest < EventPriority::Monitor);

        let mut shuffled = vec![
            EventPriority::Monitor,
            EventPriority::Normal,
            EventPriority::Lowest,
            EventPriority::Highest,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![
                EventPriority::Lowest,
                EventPriority::Normal,
                EventPriority::Highest,
                EventPriority::Monitor
            ]
        );
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("high".parse::<EventPriority>(), Ok(EventPriority::High));
        assert_eq!(" MONITOR ".parse::<EventPriority>(), Ok(EventPriority::Monitor));
        assert!("urgent".parse::<EventPriority>().is_err());
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(EventPriority::default(), EventPriority::Normal);
        assert!(EventPriority::Normal.may_suppress());
        assert!(!EventPriority::Monitor.may_suppress());
    }
}
