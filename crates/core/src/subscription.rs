//! Subscription state as reported by the billing endpoints.
//!
//! A user without a subscription is reported as `{"status": "none"}` with
//! every other field missing, so all fields except `status` are optional.
//! An absent `validations_limit` means unlimited, which is not the same
//! thing as a limit of zero.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::format::format_date;
use crate::timestamp;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const PLAN_STARTER: &str = "starter";
pub const PLAN_PRO: &str = "pro";
pub const PLAN_ENTERPRISE: &str = "enterprise";

/// All plan identifiers accepted by the checkout endpoint.
pub const VALID_PLANS: &[&str] = &[PLAN_STARTER, PLAN_PRO, PLAN_ENTERPRISE];

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PAST_DUE: &str = "past_due";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_NONE: &str = "none";

/// Label used wherever a limit is absent.
pub const UNLIMITED_LABEL: &str = "Unlimited";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Starter,
    Pro,
    Enterprise,
}

impl Plan {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            PLAN_STARTER => Ok(Self::Starter),
            PLAN_PRO => Ok(Self::Pro),
            PLAN_ENTERPRISE => Ok(Self::Enterprise),
            _ => Err(CoreError::invalid_value("plan", s, VALID_PLANS)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => PLAN_STARTER,
            Self::Pro => PLAN_PRO,
            Self::Enterprise => PLAN_ENTERPRISE,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Pro => "Pro",
            Self::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Plan {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_value(s)
    }
}

/// Billing status. Stripe statuses the app has no screen for (`trialing`,
/// `incomplete`, `unpaid`, ...) are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
    None,
    Other(String),
}

impl SubscriptionStatus {
    pub fn from_str_value(s: &str) -> Self {
        match s {
            STATUS_ACTIVE => Self::Active,
            STATUS_PAST_DUE => Self::PastDue,
            STATUS_CANCELLED => Self::Cancelled,
            STATUS_NONE => Self::None,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::PastDue => STATUS_PAST_DUE,
            Self::Cancelled => STATUS_CANCELLED,
            Self::None => STATUS_NONE,
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Badge text. A missing subscription reads as the free plan; an
    /// unrecognised status is shown capitalised.
    pub fn label(&self) -> Cow<'_, str> {
        match self {
            Self::Active => "Active".into(),
            Self::PastDue => "Past due".into(),
            Self::Cancelled => "Cancelled".into(),
            Self::None => "Free".into(),
            Self::Other(raw) => {
                let text = raw.replace('_', " ");
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>().into(),
                    None => "Unknown".into(),
                }
            }
        }
    }
}

impl From<String> for SubscriptionStatus {
    fn from(s: String) -> Self {
        match Self::from_str_value(&s) {
            Self::Other(_) => Self::Other(s),
            known => known,
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(default)]
    pub user_id: Option<DbId>,
    #[serde(default)]
    pub plan: Option<Plan>,
    pub status: SubscriptionStatus,
    /// End of the current billing period, Unix seconds.
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub validations_used: i64,
    #[serde(default)]
    pub validations_limit: Option<i64>,
    #[serde(default, deserialize_with = "crate::timestamp::option::deserialize")]
    pub created_at: Option<Timestamp>,
}

impl Subscription {
    /// True when the user is on the free plan (no paid subscription).
    pub fn is_free(&self) -> bool {
        self.status == SubscriptionStatus::None
    }

    /// Only an active subscription can be cancelled.
    pub fn can_cancel(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Upgrade prompts are shown for anything but an active subscription.
    pub fn should_offer_upgrade(&self) -> bool {
        self.status != SubscriptionStatus::Active
    }

    pub fn usage(&self) -> UsageMeter {
        UsageMeter {
            used: self.validations_used,
            limit: self.validations_limit,
        }
    }

    pub fn period_end(&self) -> Option<Timestamp> {
        self.current_period_end.and_then(timestamp::from_unix_seconds)
    }

    /// Billing-period line, e.g. `Next billing date: Mar 5, 2024`.
    ///
    /// An active subscription renews at the period end; any other status
    /// only keeps access until then.
    pub fn period_end_line(&self) -> Option<String> {
        let end = self.period_end()?;
        let label = match &self.status {
            SubscriptionStatus::Active => "Next billing date",
            _ => "Access until",
        };
        Some(format!("{label}: {}", format_date(&end)))
    }
}

/// `POST /stripe/create-checkout-session` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub plan: Plan,
}

/// Hosted checkout page to send the user to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub checkout_url: String,
}

/// `POST /stripe/cancel-subscription` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancellationResult {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Usage meter
// ---------------------------------------------------------------------------

/// Validations used against the plan limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageMeter {
    pub used: i64,
    pub limit: Option<i64>,
}

impl UsageMeter {
    /// Fill percentage of the progress bar, `None` when unlimited.
    ///
    /// A zero limit reads as exhausted.
    pub fn percent(&self) -> Option<u8> {
        let limit = self.limit?;
        if limit <= 0 {
            return Some(100);
        }
        let pct = (self.used as f64 / limit as f64 * 100.0).round();
        Some(pct.clamp(0.0, 100.0) as u8)
    }

    pub fn limit_label(&self) -> String {
        match self.limit {
            Some(limit) => limit.to_string(),
            None => UNLIMITED_LABEL.to_string(),
        }
    }
}

impl fmt::Display for UsageMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.used, self.limit_label())
    }
}
