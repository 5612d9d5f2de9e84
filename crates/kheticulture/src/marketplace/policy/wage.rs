use std::ops::RangeInclusive;

use serde::Serialize;

/// Outcome of a proposed wage change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WageDecision {
    pub can_modify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WageDecision {
    fn allowed() -> Self {
        Self {
            can_modify: true,
            reason: None,
        }
    }

    fn refused(reason: String) -> Self {
        Self {
            can_modify: false,
            reason: Some(reason),
        }
    }
}

/// Decide whether a job's wage may move from `current_wage` to `new_wage`.
///
/// Once any worker has applied the wage is locked outright: the only accepted value is
/// the current one. A non-positive wage is never accepted.
pub fn validate_wage_change(
    current_wage: i64,
    new_wage: i64,
    has_applications: bool,
    accepted_workers: usize,
) -> WageDecision {
    if new_wage <= 0 {
        return WageDecision::refused("wage must be greater than 0".to_string());
    }

    if !has_applications || new_wage == current_wage {
        return WageDecision::allowed();
    }

    let mut reason = format!(
        "wage is locked at {current_wage} because workers already applied based on it"
    );
    if accepted_workers > 0 {
        reason.push_str(&format!(
            " ({accepted_workers} worker{} already accepted)",
            if accepted_workers == 1 { "" } else { "s" }
        ));
    }
    WageDecision::refused(reason)
}

/// Range a wage edit may take, given the configured ceiling.
pub fn wage_bounds(current_wage: i64, has_applications: bool, max_wage: i64) -> RangeInclusive<i64> {
    if has_applications {
        current_wage..=current_wage
    } else {
        1..=max_wage
    }
}
