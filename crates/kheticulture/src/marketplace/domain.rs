use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for posted jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for worker applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FarmerId(pub String);

macro_rules! display_id {
    ($($name:ident),+) => {
        $(impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })+
    };
}

display_id!(JobId, ApplicationId, WorkerId, FarmerId);

/// Lifecycle of a posted job. Ordered so that `a < b` means `b` is further along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Open,
    Filled,
    InProgress,
    Completed,
}

impl JobStatus {
    /// Statuses the reconciliation pass still has to look at.
    pub const ACTIVE: [JobStatus; 3] = [JobStatus::Open, JobStatus::Filled, JobStatus::InProgress];

    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Filled => "filled",
            JobStatus::InProgress => "in-progress",
            JobStatus::Completed => "completed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationType {
    Hours,
    Days,
}

impl DurationType {
    pub const fn label(self) -> &'static str {
        match self {
            DurationType::Hours => "hours",
            DurationType::Days => "days",
        }
    }
}

/// A short-term farm job posted by a farmer.
///
/// `farmer_name` is a display cache; `farmer_id` is the owning identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub farmer_id: FarmerId,
    pub farmer_name: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub preferred_date: Option<NaiveDate>,
    pub duration: u32,
    pub duration_type: DurationType,
    /// Whole currency units per `duration_type` unit. Frozen once any application exists.
    pub wage: i64,
    pub required_workers: u32,
    pub accepted_worker_ids: Vec<WorkerId>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn accepted_count(&self) -> usize {
        self.accepted_worker_ids.len()
    }

    pub fn has_accepted(&self, worker_id: &WorkerId) -> bool {
        self.accepted_worker_ids.contains(worker_id)
    }

    /// True when no further worker can be accepted.
    pub fn is_full(&self) -> bool {
        self.accepted_count() >= self.required_workers as usize
    }

    pub fn open_positions(&self) -> usize {
        (self.required_workers as usize).saturating_sub(self.accepted_count())
    }
}

/// Farmer supplied fields for a new job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub preferred_date: Option<NaiveDate>,
    pub wage: i64,
    pub duration: u32,
    pub duration_type: DurationType,
    pub required_workers: u32,
}

/// Owner of a job posting as known at posting time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmerRef {
    pub id: FarmerId,
    pub name: String,
}

/// Farmer edit form. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEdit {
    #[serde(default)]
    pub wage: Option<i64>,
    #[serde(default)]
    pub required_workers: Option<u32>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A worker's application to a job. One record per (job, worker) pair; a rejected
/// record is recycled on reapplication.
///
/// `worker_name` and `worker_email` are display caches copied from the worker profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub worker_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
}

/// Worker identity and contact details captured when applying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub worker_id: WorkerId,
    pub name: String,
    pub email: String,
}

/// Farmer decision on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_serializes_with_hyphenated_labels() {
        let encoded = serde_json::to_string(&JobStatus::InProgress).expect("serialize");
        assert_eq!(encoded, "\"in-progress\"");
        let decoded: JobStatus = serde_json::from_str("\"filled\"").expect("deserialize");
        assert_eq!(decoded, JobStatus::Filled);
    }

    #[test]
    fn statuses_are_ordered_along_the_lifecycle() {
        assert!(JobStatus::Open < JobStatus::Filled);
        assert!(JobStatus::Filled < JobStatus::InProgress);
        assert!(JobStatus::InProgress < JobStatus::Completed);
        assert!(!JobStatus::ACTIVE.contains(&JobStatus::Completed));
    }

    #[test]
    fn job_edit_fields_default_to_absent() {
        let edit: JobEdit = serde_json::from_str(r#"{"wage": 900}"#).expect("deserialize");
        assert_eq!(edit.wage, Some(900));
        assert_eq!(edit.required_workers, None);
        assert_eq!(edit.status, None);
    }
}
