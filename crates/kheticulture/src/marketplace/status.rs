//! Job lifecycle transitions.
//!
//! `open -> filled -> in-progress -> completed`, plus `open -> in-progress` when workers are
//! accepted on or after the preferred date without filling every position. Automatic
//! recomputation never reaches `completed`; only the farmer closes a job.

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{Job, JobId, JobStatus};
use super::violation::PolicyViolation;

/// Status the job should carry on `today`, given its accepted workers and preferred date.
///
/// Guards run in order and the second sees the result of the first, so a job can move
/// `open -> filled -> in-progress` in a single pass.
pub fn next_status(job: &Job, today: NaiveDate) -> JobStatus {
    let mut status = job.status;
    if status.is_terminal() {
        return status;
    }

    let accepted = job.accepted_count();
    if accepted >= job.required_workers as usize && status == JobStatus::Open {
        status = JobStatus::Filled;
    }

    if date_reached(job.preferred_date, today)
        && accepted > 0
        && matches!(status, JobStatus::Open | JobStatus::Filled)
    {
        status = JobStatus::InProgress;
    }

    status
}

/// Pure `(Job) -> Job` recompute used by both the single-job recheck and the bulk pass.
pub fn recompute(job: &Job, today: NaiveDate) -> Job {
    Job {
        status: next_status(job, today),
        ..job.clone()
    }
}

/// Both sides are calendar days, so a job dated today is due regardless of wall-clock time.
/// Jobs without a preferred date never start on their own.
pub fn date_reached(preferred_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    preferred_date.is_some_and(|date| date <= today)
}

/// A status change the reconciliation pass wants to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDelta {
    pub job_id: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Deltas for every non-completed job whose stored status lags its conditions.
pub fn plan_reconciliation(jobs: &[Job], today: NaiveDate) -> Vec<StatusDelta> {
    jobs.iter()
        .filter(|job| !job.status.is_terminal())
        .filter_map(|job| {
            let to = next_status(job, today);
            (to != job.status).then(|| StatusDelta {
                job_id: job.id.clone(),
                from: job.status,
                to,
            })
        })
        .collect()
}

/// Guards on a farmer editing `required_workers`.
pub fn check_required_workers(
    job: &Job,
    requested: u32,
    has_applications: bool,
) -> Result<(), PolicyViolation> {
    let accepted = job.accepted_count();
    if (requested as usize) < accepted {
        return Err(PolicyViolation::RequiredWorkersBelowAccepted { accepted });
    }
    if has_applications && requested < job.required_workers {
        return Err(PolicyViolation::RequiredWorkersLocked {
            current: job.required_workers,
        });
    }
    Ok(())
}

/// Guards on a farmer setting the status by hand. These bypass the automatic
/// transitions but cannot leave `completed`, start a job nobody was accepted for, or
/// close a job that is not being worked.
pub fn check_manual_status(
    job: &Job,
    requested: JobStatus,
    accepted_after_edit: usize,
) -> Result<(), PolicyViolation> {
    if job.status.is_terminal() {
        return Err(PolicyViolation::JobCompleted);
    }
    if requested == job.status {
        return Ok(());
    }
    match requested {
        JobStatus::InProgress if accepted_after_edit == 0 => {
            Err(PolicyViolation::InProgressWithoutWorkers)
        }
        JobStatus::Completed if job.status != JobStatus::InProgress => {
            Err(PolicyViolation::NotInProgress { status: job.status })
        }
        _ => Ok(()),
    }
}
