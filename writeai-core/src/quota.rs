//! Quota gate for generation calls.
//!
//! Only free-plan profiles are metered. The counter being compared is the
//! profile's `api_usage_count`, which the service facade increments by the
//! generated word count after every successful text generation.

use crate::types::{PlanKind, Profile};

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// The call may proceed
    Allowed,
    /// The monthly limit is exhausted; the action must be blocked
    Denied { used: i64, limit: i64 },
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed)
    }
}

/// Compare a running usage counter against a plan-defined monthly limit.
///
/// Paid plans are never denied. A free plan is denied once `used >= limit`;
/// the generation that crosses the limit is still allowed in full (no
/// partial credit, no rollback).
pub fn check(plan: PlanKind, used: i64, limit: i64) -> QuotaDecision {
    match plan {
        PlanKind::Free if used >= limit => QuotaDecision::Denied { used, limit },
        _ => QuotaDecision::Allowed,
    }
}

/// Convenience wrapper taking the whole profile row.
pub fn check_profile(profile: &Profile) -> QuotaDecision {
    check(
        profile.plan,
        profile.api_usage_count,
        profile.monthly_usage_limit,
    )
}
