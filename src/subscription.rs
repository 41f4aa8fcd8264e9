//! Free-tier quotas. Everything here is a pure function of the user's tier
//! and how much they have already used; nothing is tracked separately.

use crate::{
    config::{FREE_LOG_CAP, FREE_PROPERTY_CAP, FREE_REMINDER_CAP},
    models::SubscriptionTier,
    store::Store,
};
use serde::Serialize;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Usage {
    pub properties: usize,
    pub logs: usize,
    pub reminders: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Quota {
    Limited(usize),
    Unlimited,
}

impl Quota {
    pub fn is_available(&self) -> bool {
        match self {
            Quota::Limited(left) => *left > 0,
            Quota::Unlimited => true,
        }
    }
}

impl std::fmt::Display for Quota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quota::Limited(left) => write!(f, "{left}"),
            Quota::Unlimited => write!(f, "Unlimited"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubscriptionDetails {
    pub tier: SubscriptionTier,
    pub logs_remaining: Quota,
    pub reminders_remaining: Quota,
    pub is_limited: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionPolicy {
    pub tier: SubscriptionTier,
    pub usage: Usage,
}

impl SubscriptionPolicy {
    pub fn new(tier: SubscriptionTier, usage: Usage) -> Self {
        Self { tier, usage }
    }

    pub fn for_store(store: &Store) -> Self {
        Self::new(
            store.user().subscription_tier,
            Usage {
                properties: store.properties().len(),
                logs: store.logs().len(),
                reminders: store.reminders().len(),
            },
        )
    }

    pub fn is_premium(&self) -> bool {
        self.tier == SubscriptionTier::Premium
    }

    fn remaining(&self, cap: usize, used: usize) -> Quota {
        if self.is_premium() {
            Quota::Unlimited
        } else {
            Quota::Limited(cap.saturating_sub(used))
        }
    }

    pub fn properties_remaining(&self) -> Quota {
        self.remaining(FREE_PROPERTY_CAP, self.usage.properties)
    }

    pub fn logs_remaining(&self) -> Quota {
        self.remaining(FREE_LOG_CAP, self.usage.logs)
    }

    pub fn reminders_remaining(&self) -> Quota {
        self.remaining(FREE_REMINDER_CAP, self.usage.reminders)
    }

    pub fn can_add_property(&self) -> bool {
        self.properties_remaining().is_available()
    }

    pub fn can_add_log(&self) -> bool {
        self.logs_remaining().is_available()
    }

    pub fn can_add_reminder(&self) -> bool {
        self.reminders_remaining().is_available()
    }

    pub fn details(&self) -> SubscriptionDetails {
        SubscriptionDetails {
            tier: self.tier,
            logs_remaining: self.logs_remaining(),
            reminders_remaining: self.reminders_remaining(),
            is_limited: !self.is_premium(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free(logs: usize, reminders: usize) -> SubscriptionPolicy {
        SubscriptionPolicy::new(
            SubscriptionTier::Free,
            Usage {
                properties: 1,
                logs,
                reminders,
            },
        )
    }

    #[test]
    fn test_free_log_quota_runs_out_at_three() {
        assert!(free(0, 0).can_add_log());
        assert!(free(2, 0).can_add_log());
        assert!(!free(3, 0).can_add_log());
        assert_eq!(free(2, 0).logs_remaining(), Quota::Limited(1));
        // Seeded data can put a free account over the cap; never negative.
        assert_eq!(free(5, 0).logs_remaining(), Quota::Limited(0));
    }

    #[test]
    fn test_free_reminder_quota_is_one() {
        assert!(free(0, 0).can_add_reminder());
        assert!(!free(0, 1).can_add_reminder());
    }

    #[test]
    fn test_free_property_quota_is_one() {
        let mut policy = free(0, 0);
        assert!(!policy.can_add_property());
        policy.usage.properties = 0;
        assert!(policy.can_add_property());
    }

    #[test]
    fn test_premium_is_unlimited() {
        let policy = SubscriptionPolicy::new(
            SubscriptionTier::Premium,
            Usage {
                properties: 9,
                logs: 100,
                reminders: 40,
            },
        );
        assert!(policy.can_add_log());
        assert!(policy.can_add_reminder());
        assert!(policy.can_add_property());
        assert_eq!(
            policy.details(),
            SubscriptionDetails {
                tier: SubscriptionTier::Premium,
                logs_remaining: Quota::Unlimited,
                reminders_remaining: Quota::Unlimited,
                is_limited: false,
            }
        );
    }

    #[test]
    fn test_details_for_free_user() {
        let details = free(1, 1).details();
        assert!(details.is_limited);
        assert_eq!(details.logs_remaining.to_string(), "2");
        assert_eq!(details.reminders_remaining.to_string(), "0");
    }
}
