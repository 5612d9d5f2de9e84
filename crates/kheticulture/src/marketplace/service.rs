use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::MarketplaceConfig;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Decision, FarmerId, FarmerRef, Job, JobDraft,
    JobEdit, JobId, JobStatus, WorkerId, WorkerProfile,
};
use super::gateway::{
    ApplicationFilter, ApplicationPatch, GatewayError, JobFilter, JobPatch, MarketplaceGateway,
};
use super::policy::{validate_wage_change, wage_bounds, CooldownPolicy};
use super::search::JobSearch;
use super::stats::{FarmerStats, WorkerStats};
use super::status::{self, StatusDelta};
use super::violation::{PolicyViolation, ValidationError};

/// Service enforcing the job lifecycle and application matching rules on top of a gateway.
///
/// Every rule is re-checked here against freshly read records; callers' own pre-checks are
/// never trusted.
pub struct MarketplaceService<G> {
    gateway: Arc<G>,
    config: MarketplaceConfig,
    cooldown: CooldownPolicy,
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Calendar day used for date guards.
fn calendar_day(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Result of a farmer's accept/reject decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionOutcome {
    pub application: Application,
    pub job: Job,
}

/// Summary of a completed cascading delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionSummary {
    pub job_id: JobId,
    pub applications_removed: usize,
}

/// Outcome of one bulk status pass. Failed deltas are retried by the next pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub examined: usize,
    pub advanced: Vec<StatusDelta>,
    pub failed: Vec<StatusDelta>,
    /// Jobs as they stand after the pass, failed ones keeping their stored status.
    pub jobs: Vec<Job>,
}

/// A worker's standing on one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantView {
    pub job_id: JobId,
    pub worker_id: WorkerId,
    pub status: Option<ApplicationStatus>,
    pub can_apply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_until_reapply: Option<u32>,
}

/// Wage values a farmer may still pick for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WageRange {
    pub job_id: JobId,
    pub current: i64,
    pub min: i64,
    pub max: i64,
    pub locked: bool,
    pub applications: usize,
}

impl<G> MarketplaceService<G>
where
    G: MarketplaceGateway + 'static,
{
    pub fn new(gateway: Arc<G>, config: MarketplaceConfig) -> Self {
        let cooldown = CooldownPolicy::new(config.reapply_cooldown_hours);
        Self {
            gateway,
            config,
            cooldown,
        }
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    pub fn cooldown(&self) -> CooldownPolicy {
        self.cooldown
    }

    /// Publish a new job in the `open` state.
    pub fn post_job(
        &self,
        farmer: FarmerRef,
        draft: JobDraft,
        now: DateTime<Utc>,
    ) -> Result<Job, ServiceError> {
        self.validate_draft(&farmer, &draft)?;

        let job = Job {
            id: next_job_id(),
            farmer_id: farmer.id,
            farmer_name: farmer.name.trim().to_string(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            location: draft.location.trim().to_string(),
            preferred_date: draft.preferred_date,
            duration: draft.duration,
            duration_type: draft.duration_type,
            wage: draft.wage,
            required_workers: draft.required_workers,
            accepted_worker_ids: Vec::new(),
            status: JobStatus::Open,
            created_at: now,
            updated_at: None,
        };

        self.gateway
            .insert_job(job.clone())
            .map_err(|err| persistence("insert job", &job.id, err))?;
        info!(job_id = %job.id, farmer_id = %job.farmer_id, "job posted");
        Ok(job)
    }

    fn validate_draft(&self, farmer: &FarmerRef, draft: &JobDraft) -> Result<(), ValidationError> {
        require("farmer_id", &farmer.id.0)?;
        require("title", &draft.title)?;
        require("description", &draft.description)?;
        require("location", &draft.location)?;
        self.validate_wage(draft.wage)?;
        if draft.duration == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }
        if draft.required_workers == 0 {
            return Err(ValidationError::NonPositiveWorkers);
        }
        Ok(())
    }

    fn validate_wage(&self, wage: i64) -> Result<(), ValidationError> {
        if wage <= 0 {
            return Err(ValidationError::NonPositiveWage);
        }
        if wage > self.config.max_wage {
            return Err(ValidationError::WageAboveMaximum {
                wage,
                max: self.config.max_wage,
            });
        }
        Ok(())
    }

    /// Apply a farmer's edit to wage, required workers and/or status, then recheck the
    /// automatic transitions.
    pub fn edit_job(
        &self,
        job_id: &JobId,
        edit: JobEdit,
        now: DateTime<Utc>,
    ) -> Result<Job, ServiceError> {
        let job = self.load_job(job_id)?;
        if job.status.is_terminal() {
            return Err(PolicyViolation::JobCompleted.into());
        }

        let applications = self.applications_for(job_id)?;
        let has_applications = !applications.is_empty();
        let mut patch = JobPatch::default();

        if let Some(wage) = edit.wage.filter(|wage| *wage != job.wage) {
            let decision =
                validate_wage_change(job.wage, wage, has_applications, job.accepted_count());
            if !decision.can_modify && has_applications {
                debug!(job_id = %job_id, reason = ?decision.reason, "wage change refused");
                return Err(PolicyViolation::WageLocked {
                    current: job.wage,
                    applications: applications.len(),
                }
                .into());
            }
            self.validate_wage(wage)?;
            patch.wage = Some(wage);
        }

        if let Some(required) = edit.required_workers {
            if required == 0 {
                return Err(ValidationError::NonPositiveWorkers.into());
            }
            status::check_required_workers(&job, required, has_applications)?;
            if required != job.required_workers {
                patch.required_workers = Some(required);
            }
        }

        if let Some(requested) = edit.status {
            status::check_manual_status(&job, requested, job.accepted_count())?;
            if requested != job.status {
                patch.status = Some(requested);
            }
        }

        if patch.is_empty() {
            return Ok(job);
        }

        patch.updated_at = Some(now);
        if patch.wage.is_some() {
            patch.if_application_count = Some(applications.len());
        }
        match self.gateway.update_job(job_id, patch.clone()) {
            Ok(()) => {}
            Err(GatewayError::Conflict) => return Err(self.wage_edit_conflict(&job)),
            Err(err) => return Err(persistence("update job", job_id, err)),
        }
        info!(job_id = %job_id, "job edited");

        let mut known = job;
        patch.apply_to(&mut known);
        Ok(self.recheck_or_known(known, now))
    }

    /// A worker applied while the wage edit was in flight.
    fn wage_edit_conflict(&self, job: &Job) -> ServiceError {
        match self.applications_for(&job.id) {
            Ok(applications) if !applications.is_empty() => PolicyViolation::WageLocked {
                current: job.wage,
                applications: applications.len(),
            }
            .into(),
            Ok(_) => persistence("update job", &job.id, GatewayError::Conflict),
            Err(err) => err,
        }
    }

    /// Submit (or recycle after cooldown) the worker's application to a job.
    pub fn apply(
        &self,
        job_id: &JobId,
        worker: WorkerProfile,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Application, ServiceError> {
        require("worker_id", &worker.worker_id.0)?;

        let job = self.load_job(job_id)?;
        if job.status.is_terminal() {
            return Err(PolicyViolation::JobCompleted.into());
        }

        let existing = self
            .gateway
            .list_applications(&ApplicationFilter::for_pair(job_id, &worker.worker_id))
            .map_err(|err| persistence("list applications", job_id, err))?
            .into_iter()
            .next();

        if let Some(existing) = &existing {
            match existing.status {
                ApplicationStatus::Pending => return Err(PolicyViolation::AlreadyPending.into()),
                ApplicationStatus::Accepted => {
                    return Err(PolicyViolation::AlreadyAccepted.into())
                }
                ApplicationStatus::Rejected => {
                    if !self.cooldown.application_can_reapply(existing, now) {
                        let hours_remaining = self
                            .cooldown
                            .application_hours_until_reapply(existing, now)
                            .unwrap_or(0);
                        return Err(PolicyViolation::CooldownActive { hours_remaining }.into());
                    }
                }
            }
        }

        if job.is_full() {
            return Err(PolicyViolation::PositionsFilled.into());
        }

        match existing {
            Some(rejected) => {
                let patch = ApplicationPatch {
                    status: Some(ApplicationStatus::Pending),
                    applied_at: Some(now),
                    rejected_at: Some(None),
                };
                let mut recycled = rejected;
                patch.apply_to(&mut recycled);
                self.gateway
                    .update_application(&recycled.id, patch)
                    .map_err(|err| persistence("reactivate application", &recycled.id, err))?;
                info!(
                    application_id = %recycled.id,
                    job_id = %job_id,
                    worker_id = %recycled.worker_id,
                    "rejected application reactivated"
                );
                Ok(recycled)
            }
            None => {
                let application = Application {
                    id: next_application_id(),
                    job_id: job_id.clone(),
                    worker_id: worker.worker_id,
                    worker_name: worker.name.trim().to_string(),
                    worker_email: worker.email.trim().to_string(),
                    message: message
                        .map(|message| message.trim().to_string())
                        .filter(|message| !message.is_empty()),
                    status: ApplicationStatus::Pending,
                    applied_at: now,
                    rejected_at: None,
                };
                match self.gateway.insert_application(application.clone()) {
                    Ok(()) => {}
                    Err(GatewayError::Conflict) => {
                        return Err(self.apply_conflict(job_id, &application.worker_id))
                    }
                    Err(err) => {
                        return Err(persistence("insert application", &application.id, err))
                    }
                }
                info!(
                    application_id = %application.id,
                    job_id = %job_id,
                    worker_id = %application.worker_id,
                    "application submitted"
                );
                Ok(application)
            }
        }
    }

    /// Another submission for the same pair landed between our lookup and insert.
    fn apply_conflict(&self, job_id: &JobId, worker_id: &WorkerId) -> ServiceError {
        let existing = self
            .gateway
            .list_applications(&ApplicationFilter::for_pair(job_id, worker_id))
            .map(|applications| applications.into_iter().next());
        match existing {
            Ok(Some(application)) => match application.status {
                ApplicationStatus::Accepted => PolicyViolation::AlreadyAccepted.into(),
                ApplicationStatus::Pending | ApplicationStatus::Rejected => {
                    PolicyViolation::AlreadyPending.into()
                }
            },
            Ok(None) => persistence("insert application", job_id, GatewayError::Conflict),
            Err(err) => persistence("reload application", job_id, err),
        }
    }

    /// Accept or reject a pending application.
    pub fn decide(
        &self,
        application_id: &ApplicationId,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<DecisionOutcome, ServiceError> {
        let application = self.load_application(application_id)?;
        let job = self.load_job(&application.job_id)?;
        if job.status.is_terminal() {
            return Err(PolicyViolation::JobCompleted.into());
        }

        match decision {
            Decision::Accept => self.accept(application, job, now),
            Decision::Reject => self.reject(application, job, now),
        }
    }

    fn accept(
        &self,
        mut application: Application,
        job: Job,
        now: DateTime<Utc>,
    ) -> Result<DecisionOutcome, ServiceError> {
        match application.status {
            ApplicationStatus::Accepted => {
                debug!(application_id = %application.id, "application already accepted");
                return Ok(DecisionOutcome { application, job });
            }
            ApplicationStatus::Rejected => {
                return Err(PolicyViolation::NotPending {
                    status: application.status,
                }
                .into())
            }
            ApplicationStatus::Pending => {}
        }

        let previous = job.accepted_worker_ids.clone();
        let reserved = !job.has_accepted(&application.worker_id);
        if reserved {
            if job.is_full() {
                return Err(PolicyViolation::CapacityExceeded {
                    required: job.required_workers,
                }
                .into());
            }

            let mut accepted = previous.clone();
            accepted.push(application.worker_id.clone());
            let patch = JobPatch {
                accepted_worker_ids: Some(accepted),
                updated_at: Some(now),
                if_accepted_count: Some(previous.len()),
                ..JobPatch::default()
            };
            match self.gateway.update_job(&job.id, patch) {
                Ok(()) => {}
                Err(GatewayError::Conflict) => return Err(self.accept_conflict(&job.id)),
                Err(err) => return Err(persistence("reserve position", &job.id, err)),
            }
        }

        let patch = ApplicationPatch {
            status: Some(ApplicationStatus::Accepted),
            ..ApplicationPatch::default()
        };
        if let Err(err) = self.gateway.update_application(&application.id, patch) {
            if reserved {
                self.release_position(&job.id, previous, now);
            }
            return Err(persistence("accept application", &application.id, err));
        }
        application.status = ApplicationStatus::Accepted;
        info!(
            application_id = %application.id,
            job_id = %job.id,
            worker_id = %application.worker_id,
            "application accepted"
        );

        let mut known = job;
        if reserved {
            known.accepted_worker_ids.push(application.worker_id.clone());
            known.updated_at = Some(now);
        }
        let job = self.recheck_or_known(known, now);
        Ok(DecisionOutcome { application, job })
    }

    /// Another writer moved the accepted list between our read and write.
    fn accept_conflict(&self, job_id: &JobId) -> ServiceError {
        match self.gateway.fetch_job(job_id) {
            Ok(Some(fresh)) if fresh.is_full() => PolicyViolation::CapacityExceeded {
                required: fresh.required_workers,
            }
            .into(),
            Ok(Some(_)) | Ok(None) => persistence("reserve position", job_id, GatewayError::Conflict),
            Err(err) => persistence("reload job", job_id, err),
        }
    }

    fn release_position(&self, job_id: &JobId, previous: Vec<WorkerId>, now: DateTime<Utc>) {
        let patch = JobPatch {
            accepted_worker_ids: Some(previous),
            updated_at: Some(now),
            ..JobPatch::default()
        };
        if let Err(err) = self.gateway.update_job(job_id, patch) {
            error!(job_id = %job_id, error = %err, "failed to release reserved position");
        }
    }

    fn reject(
        &self,
        mut application: Application,
        job: Job,
        now: DateTime<Utc>,
    ) -> Result<DecisionOutcome, ServiceError> {
        match application.status {
            ApplicationStatus::Rejected => {
                debug!(application_id = %application.id, "application already rejected");
                return Ok(DecisionOutcome { application, job });
            }
            ApplicationStatus::Accepted => {
                return Err(PolicyViolation::NotPending {
                    status: application.status,
                }
                .into())
            }
            ApplicationStatus::Pending => {}
        }

        let patch = ApplicationPatch {
            status: Some(ApplicationStatus::Rejected),
            rejected_at: Some(Some(now)),
            ..ApplicationPatch::default()
        };
        self.gateway
            .update_application(&application.id, patch.clone())
            .map_err(|err| persistence("reject application", &application.id, err))?;
        patch.apply_to(&mut application);
        info!(application_id = %application.id, job_id = %job.id, "application rejected");
        Ok(DecisionOutcome { application, job })
    }

    /// Close an in-progress job for good.
    pub fn mark_completed(&self, job_id: &JobId, now: DateTime<Utc>) -> Result<Job, ServiceError> {
        let mut job = self.load_job(job_id)?;
        if job.status != JobStatus::InProgress {
            return Err(PolicyViolation::NotInProgress { status: job.status }.into());
        }

        let patch = JobPatch::status(JobStatus::Completed, now);
        self.gateway
            .update_job(job_id, patch.clone())
            .map_err(|err| persistence("complete job", job_id, err))?;
        patch.apply_to(&mut job);
        info!(job_id = %job_id, "job completed");
        Ok(job)
    }

    /// Remove a job together with every application that references it.
    pub fn delete_job(&self, job_id: &JobId) -> Result<DeletionSummary, ServiceError> {
        let job = self.load_job(job_id)?;
        if job.status.is_terminal() {
            return Err(PolicyViolation::JobCompleted.into());
        }

        let applications_removed = self.applications_for(job_id)?.len();
        // Applications go first so a failure never leaves them pointing at a missing job.
        self.gateway
            .delete_applications_for_job(job_id)
            .map_err(|err| persistence("delete applications", job_id, err))?;
        self.gateway
            .delete_job(job_id)
            .map_err(|err| persistence("delete job", job_id, err))?;

        info!(job_id = %job_id, applications_removed, "job deleted");
        Ok(DeletionSummary {
            job_id: job_id.clone(),
            applications_removed,
        })
    }

    /// Recompute one job's status and persist the change, if any.
    ///
    /// A failed write is logged and the stored job is returned unchanged; the next
    /// reconciliation pass picks it up again.
    pub fn recheck_job(&self, job_id: &JobId, now: DateTime<Utc>) -> Result<Job, ServiceError> {
        let job = self.load_job(job_id)?;
        let next = status::next_status(&job, calendar_day(now));
        if next == job.status {
            return Ok(job);
        }

        match self.gateway.update_job(job_id, JobPatch::status(next, now)) {
            Ok(()) => {
                info!(job_id = %job_id, from = %job.status, to = %next, "job status advanced");
                Ok(Job {
                    status: next,
                    updated_at: Some(now),
                    ..job
                })
            }
            Err(err) => {
                error!(job_id = %job_id, to = %next, error = %err, "failed to persist job status");
                Ok(job)
            }
        }
    }

    /// Recheck after a committed write. A failed recheck is logged and the caller gets the
    /// job as written.
    fn recheck_or_known(&self, known: Job, now: DateTime<Utc>) -> Job {
        match self.recheck_job(&known.id, now) {
            Ok(job) => job,
            Err(err) => {
                warn!(job_id = %known.id, error = %err, "status recheck skipped");
                known
            }
        }
    }

    /// Bulk pass over every non-completed job, persisting status deltas.
    pub fn reconcile_statuses(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ReconciliationReport, ServiceError> {
        let mut jobs = self
            .gateway
            .list_jobs(&JobFilter::active())
            .map_err(|err| {
                error!(error = %err, "failed to load jobs for reconciliation");
                ServiceError::Persistence(err)
            })?;

        let deltas = status::plan_reconciliation(&jobs, calendar_day(now));
        let mut report = ReconciliationReport {
            examined: jobs.len(),
            ..ReconciliationReport::default()
        };

        for delta in deltas {
            match self
                .gateway
                .update_job(&delta.job_id, JobPatch::status(delta.to, now))
            {
                Ok(()) => {
                    info!(job_id = %delta.job_id, from = %delta.from, to = %delta.to, "job status advanced");
                    if let Some(job) = jobs.iter_mut().find(|job| job.id == delta.job_id) {
                        job.status = delta.to;
                        job.updated_at = Some(now);
                    }
                    report.advanced.push(delta);
                }
                Err(err) => {
                    error!(job_id = %delta.job_id, to = %delta.to, error = %err, "failed to persist job status");
                    report.failed.push(delta);
                }
            }
        }

        if !report.failed.is_empty() {
            warn!(failed = report.failed.len(), "reconciliation left jobs behind");
        }
        report.jobs = jobs;
        Ok(report)
    }

    pub fn job(&self, job_id: &JobId) -> Result<Job, ServiceError> {
        self.load_job(job_id)
    }

    /// Jobs matching `filter`, newest first. Unbounded filters are capped by configuration.
    pub fn jobs(&self, filter: JobFilter) -> Result<Vec<Job>, ServiceError> {
        let filter = match filter.limit {
            Some(_) => filter,
            None => filter.with_limit(self.config.job_list_limit),
        };
        self.gateway
            .list_jobs(&filter)
            .map_err(ServiceError::Persistence)
    }

    pub fn applications(&self, filter: ApplicationFilter) -> Result<Vec<Application>, ServiceError> {
        let filter = match filter.limit {
            Some(_) => filter,
            None => filter.with_limit(self.config.application_list_limit),
        };
        self.gateway
            .list_applications(&filter)
            .map_err(ServiceError::Persistence)
    }

    pub fn search(&self, search: &JobSearch) -> Result<Vec<Job>, ServiceError> {
        Ok(search.apply(self.jobs(JobFilter::default())?))
    }

    /// What the worker sees for this job: their application state and whether they may apply.
    pub fn applicant_view(
        &self,
        job_id: &JobId,
        worker_id: &WorkerId,
        now: DateTime<Utc>,
    ) -> Result<ApplicantView, ServiceError> {
        let job = self.load_job(job_id)?;
        let existing = self
            .gateway
            .list_applications(&ApplicationFilter::for_pair(job_id, worker_id))
            .map_err(ServiceError::Persistence)?
            .into_iter()
            .next();

        let open = !job.status.is_terminal() && !job.is_full();
        let (status, can_apply, hours_until_reapply) = match &existing {
            None => (None, open, None),
            Some(application) => (
                Some(application.status),
                open && self.cooldown.application_can_reapply(application, now),
                self.cooldown.application_hours_until_reapply(application, now),
            ),
        };

        Ok(ApplicantView {
            job_id: job_id.clone(),
            worker_id: worker_id.clone(),
            status,
            can_apply,
            hours_until_reapply,
        })
    }

    /// Wage range the edit form should offer for this job.
    pub fn wage_range(&self, job_id: &JobId) -> Result<WageRange, ServiceError> {
        let job = self.load_job(job_id)?;
        let applications = self.applications_for(job_id)?.len();
        let bounds = wage_bounds(job.wage, applications > 0, self.config.max_wage);
        Ok(WageRange {
            job_id: job.id,
            current: job.wage,
            min: *bounds.start(),
            max: *bounds.end(),
            locked: applications > 0,
            applications,
        })
    }

    pub fn worker_stats(&self, worker_id: &WorkerId) -> Result<WorkerStats, ServiceError> {
        let applications = self
            .gateway
            .list_applications(&ApplicationFilter::for_worker(worker_id))
            .map_err(ServiceError::Persistence)?;
        let jobs = self
            .gateway
            .list_jobs(&JobFilter::default())
            .map_err(ServiceError::Persistence)?;
        Ok(WorkerStats::collect(worker_id, &applications, &jobs))
    }

    pub fn farmer_stats(&self, farmer_id: &FarmerId) -> Result<FarmerStats, ServiceError> {
        let jobs = self
            .gateway
            .list_jobs(&JobFilter::by_farmer(farmer_id))
            .map_err(ServiceError::Persistence)?;
        Ok(FarmerStats::collect(farmer_id, &jobs))
    }

    fn load_job(&self, job_id: &JobId) -> Result<Job, ServiceError> {
        self.gateway
            .fetch_job(job_id)
            .map_err(|err| persistence("load job", job_id, err))?
            .ok_or_else(|| ServiceError::NotFound(format!("job {job_id}")))
    }

    fn load_application(&self, application_id: &ApplicationId) -> Result<Application, ServiceError> {
        self.gateway
            .fetch_application(application_id)
            .map_err(|err| persistence("load application", application_id, err))?
            .ok_or_else(|| ServiceError::NotFound(format!("application {application_id}")))
    }

    fn applications_for(&self, job_id: &JobId) -> Result<Vec<Application>, ServiceError> {
        self.gateway
            .list_applications(&ApplicationFilter::for_job(job_id))
            .map_err(|err| persistence("list applications", job_id, err))
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::BlankField { field })
    } else {
        Ok(())
    }
}

fn persistence(action: &str, id: &dyn std::fmt::Display, err: GatewayError) -> ServiceError {
    match err {
        GatewayError::NotFound => ServiceError::NotFound(id.to_string()),
        err => {
            error!(%id, error = %err, "{action} failed");
            ServiceError::Persistence(err)
        }
    }
}

/// Broad failure categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Policy,
    NotFound,
    Persistence,
}

/// Error raised by the marketplace service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Persistence(GatewayError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Policy(_) => ErrorKind::Policy,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub fn policy(&self) -> Option<&PolicyViolation> {
        match self {
            ServiceError::Policy(violation) => Some(violation),
            _ => None,
        }
    }
}
