//! Subscription plan catalog and billing periods.

use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Cents, PlanId};

/// Billing period of a subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl SubscriptionPeriod {
    /// Expiry for a subscription starting at `from`. Month arithmetic
    /// clamps to the end of shorter months.
    pub fn next_expiry(self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            SubscriptionPeriod::Weekly => from + Days::new(7),
            SubscriptionPeriod::Monthly => from + Months::new(1),
            SubscriptionPeriod::Yearly => from + Months::new(12),
        }
    }
}

impl fmt::Display for SubscriptionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubscriptionPeriod::Weekly => "weekly",
            SubscriptionPeriod::Monthly => "monthly",
            SubscriptionPeriod::Yearly => "yearly",
        };
        f.write_str(label)
    }
}

/// A purchasable subscription tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub name: String,
    pub period: SubscriptionPeriod,
    pub price: Cents,
    pub features: Vec<String>,
}
