use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, FarmerId, Job, JobId, JobStatus, WorkerId,
};

/// Selection criteria for job listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub job_id: Option<JobId>,
    pub farmer_id: Option<FarmerId>,
    /// Empty means any status.
    pub statuses: Vec<JobStatus>,
    pub limit: Option<usize>,
}

impl JobFilter {
    pub fn by_id(id: &JobId) -> Self {
        Self {
            job_id: Some(id.clone()),
            ..Self::default()
        }
    }

    pub fn by_farmer(farmer_id: &FarmerId) -> Self {
        Self {
            farmer_id: Some(farmer_id.clone()),
            ..Self::default()
        }
    }

    pub fn active() -> Self {
        Self {
            statuses: JobStatus::ACTIVE.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.job_id.as_ref().map_or(true, |id| &job.id == id)
            && self.farmer_id.as_ref().map_or(true, |id| &job.farmer_id == id)
            && (self.statuses.is_empty() || self.statuses.contains(&job.status))
    }
}

/// Selection criteria for application listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub application_id: Option<ApplicationId>,
    pub job_id: Option<JobId>,
    pub worker_id: Option<WorkerId>,
    pub status: Option<ApplicationStatus>,
    pub limit: Option<usize>,
}

impl ApplicationFilter {
    pub fn by_id(id: &ApplicationId) -> Self {
        Self {
            application_id: Some(id.clone()),
            ..Self::default()
        }
    }

    pub fn for_job(job_id: &JobId) -> Self {
        Self {
            job_id: Some(job_id.clone()),
            ..Self::default()
        }
    }

    pub fn for_worker(worker_id: &WorkerId) -> Self {
        Self {
            worker_id: Some(worker_id.clone()),
            ..Self::default()
        }
    }

    pub fn for_pair(job_id: &JobId, worker_id: &WorkerId) -> Self {
        Self {
            job_id: Some(job_id.clone()),
            worker_id: Some(worker_id.clone()),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, application: &Application) -> bool {
        self.application_id
            .as_ref()
            .map_or(true, |id| &application.id == id)
            && self.job_id.as_ref().map_or(true, |id| &application.job_id == id)
            && self
                .worker_id
                .as_ref()
                .map_or(true, |id| &application.worker_id == id)
            && self.status.map_or(true, |status| application.status == status)
    }
}

/// Partial job update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub wage: Option<i64>,
    pub required_workers: Option<u32>,
    pub status: Option<JobStatus>,
    pub accepted_worker_ids: Option<Vec<WorkerId>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Write only if the stored job still has exactly this many accepted workers;
    /// otherwise the gateway answers `GatewayError::Conflict`.
    pub if_accepted_count: Option<usize>,
    /// Write only if the job still has exactly this many applications; otherwise
    /// `GatewayError::Conflict`.
    pub if_application_count: Option<usize>,
}

impl JobPatch {
    pub fn status(status: JobStatus, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(status),
            updated_at: Some(at),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.wage.is_none()
            && self.required_workers.is_none()
            && self.status.is_none()
            && self.accepted_worker_ids.is_none()
    }

    pub fn apply_to(&self, job: &mut Job) {
        if let Some(wage) = self.wage {
            job.wage = wage;
        }
        if let Some(required) = self.required_workers {
            job.required_workers = required;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(accepted) = &self.accepted_worker_ids {
            job.accepted_worker_ids = accepted.clone();
        }
        if let Some(at) = self.updated_at {
            job.updated_at = Some(at);
        }
    }
}

/// Partial application update. `rejected_at: Some(None)` clears the timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub applied_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<Option<DateTime<Utc>>>,
}

impl ApplicationPatch {
    pub fn apply_to(&self, application: &mut Application) {
        if let Some(status) = self.status {
            application.status = status;
        }
        if let Some(at) = self.applied_at {
            application.applied_at = at;
        }
        if let Some(rejected_at) = self.rejected_at {
            application.rejected_at = rejected_at;
        }
    }
}

/// Storage abstraction over the remote job and application tables.
///
/// Listings come back newest first: jobs by `created_at`, applications by `applied_at`.
pub trait MarketplaceGateway: Send + Sync {
    fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, GatewayError>;
    fn insert_job(&self, job: Job) -> Result<(), GatewayError>;
    fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<(), GatewayError>;
    fn delete_job(&self, id: &JobId) -> Result<(), GatewayError>;

    fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, GatewayError>;
    /// At most one application per (job, worker) pair; a second insert for the same pair
    /// answers `GatewayError::Conflict`.
    fn insert_application(&self, application: Application) -> Result<(), GatewayError>;
    fn update_application(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<(), GatewayError>;
    fn delete_applications_for_job(&self, job_id: &JobId) -> Result<(), GatewayError>;

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, GatewayError> {
        Ok(self.list_jobs(&JobFilter::by_id(id))?.into_iter().next())
    }

    fn fetch_application(&self, id: &ApplicationId) -> Result<Option<Application>, GatewayError> {
        Ok(self
            .list_applications(&ApplicationFilter::by_id(id))?
            .into_iter()
            .next())
    }
}

/// Error enumeration for gateway failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("record not found")]
    NotFound,
    #[error("record changed concurrently")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
