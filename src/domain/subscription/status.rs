//! Subscription status as persisted locally.
//!
//! The payment provider knows more lifecycle states than the product cares about.
//! Provider values are folded into the four local states here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Locally persisted billing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and current. The only status that unlocks premium features.
    Active,

    /// A payment attempt failed; the provider is retrying.
    PastDue,

    /// Subscription ended. The record is kept.
    Canceled,

    /// Initial payment has not completed yet.
    Incomplete,
}

impl SubscriptionStatus {
    /// Maps a provider status string to the local status.
    ///
    /// Returns `None` for provider states with no local meaning (e.g. `paused`).
    pub fn from_provider(status: &str) -> Option<Self> {
        match status {
            "active" | "trialing" => Some(Self::Active),
            "past_due" | "unpaid" => Some(Self::PastDue),
            "canceled" | "incomplete_expired" => Some(Self::Canceled),
            "incomplete" => Some(Self::Incomplete),
            _ => None,
        }
    }

    /// Parses the value stored in the `status` column.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "past_due" => Some(Self::PastDue),
            "canceled" => Some(Self::Canceled),
            "incomplete" => Some(Self::Incomplete),
            _ => None,
        }
    }

    /// Column representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
        }
    }

    /// Returns true if this status unlocks premium features.
    pub fn is_premium(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
