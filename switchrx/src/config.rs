#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What happens to an operation once a newer push supersedes it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CancelPolicy {
    /// Signal the token and keep polling the future to completion. Its
    /// outcome is discarded.
    #[default]
    Cooperative,
    /// Signal the token and drop the future as soon as the token fires.
    Abort,
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
/// Config values for [`RequestCoalescer`](crate::RequestCoalescer).
pub struct CoalescerConfig {
    /// How superseded operations are cancelled
    pub cancel_policy: CancelPolicy,
    /// Whether `Loading` and `Fail` statuses keep the last successful value
    pub retain_value: bool,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            cancel_policy: CancelPolicy::Cooperative,
            retain_value: true,
        }
    }
}

impl CoalescerConfig {
    pub fn with_cancel_policy(self, cancel_policy: CancelPolicy) -> Self {
        Self {
            cancel_policy,
            ..self
        }
    }

    pub fn with_retain_value(self, retain_value: bool) -> Self {
        Self {
            retain_value,
            ..self
        }
    }

    /// Parses a config from JSON. Missing fields fall back to their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
