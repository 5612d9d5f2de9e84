use serde::Serialize;

use super::domain::{ApplicationStatus, JobStatus};

/// Malformed farmer or worker input. Callers should re-prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    BlankField { field: &'static str },
    #[error("wage must be greater than 0")]
    NonPositiveWage,
    #[error("wage of {wage} is above the allowed maximum of {max}")]
    WageAboveMaximum { wage: i64, max: i64 },
    #[error("duration must be greater than 0")]
    NonPositiveDuration,
    #[error("required workers must be greater than 0")]
    NonPositiveWorkers,
}

/// Expected business conditions surfaced to users; none of these indicate a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum PolicyViolation {
    #[error("cannot modify wage: {applications} application(s) were made at {current}; wage changes are locked once workers apply")]
    WageLocked { current: i64, applications: usize },
    #[error("accepting would exceed the {required} required worker(s)")]
    CapacityExceeded { required: u32 },
    #[error("all positions for this job are filled")]
    PositionsFilled,
    #[error("you can reapply in {hours_remaining} hour(s)")]
    CooldownActive { hours_remaining: u32 },
    #[error("an application for this job is already pending")]
    AlreadyPending,
    #[error("the application has already been accepted")]
    AlreadyAccepted,
    #[error("the job is completed and can no longer change")]
    JobCompleted,
    #[error("only in-progress jobs can be completed (job is {status})")]
    NotInProgress { status: JobStatus },
    #[error("required workers cannot drop below the {accepted} already accepted")]
    RequiredWorkersBelowAccepted { accepted: usize },
    #[error("required workers cannot drop below {current} once workers have applied")]
    RequiredWorkersLocked { current: u32 },
    #[error("a job without accepted workers cannot be in progress")]
    InProgressWithoutWorkers,
    #[error("only pending applications can be decided (application is {status})")]
    NotPending { status: ApplicationStatus },
}
