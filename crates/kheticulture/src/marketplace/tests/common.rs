use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::config::MarketplaceConfig;
use crate::marketplace::domain::{
    Application, ApplicationId, ApplicationStatus, DurationType, FarmerId, FarmerRef, Job,
    JobDraft, JobId, WorkerId, WorkerProfile,
};
use crate::marketplace::gateway::{
    ApplicationFilter, ApplicationPatch, GatewayError, JobFilter, JobPatch, MarketplaceGateway,
};
use crate::marketplace::{marketplace_router, InMemoryGateway, MarketplaceService};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 10, 9, 30, 0).unwrap()
}

pub(super) fn today() -> NaiveDate {
    now().date_naive()
}

pub(super) fn hours_later(hours: i64) -> DateTime<Utc> {
    now() + Duration::hours(hours)
}

pub(super) fn farmer() -> FarmerRef {
    FarmerRef {
        id: FarmerId("farmer-sita".to_string()),
        name: "Sita Tharu".to_string(),
    }
}

pub(super) fn draft(required_workers: u32, preferred_date: Option<NaiveDate>) -> JobDraft {
    JobDraft {
        title: "Paddy transplanting".to_string(),
        description: "Transplant seedlings across four ropani".to_string(),
        location: "Bharatpur, Chitwan".to_string(),
        preferred_date,
        wage: 1200,
        duration: 2,
        duration_type: DurationType::Days,
        required_workers,
    }
}

pub(super) fn next_week() -> Option<NaiveDate> {
    Some(today() + Duration::days(7))
}

pub(super) fn worker(n: usize) -> WorkerProfile {
    WorkerProfile {
        worker_id: WorkerId(format!("worker-{n}")),
        name: format!("Worker {n}"),
        email: format!("worker{n}@example.com"),
    }
}

pub(super) fn build_service() -> (MarketplaceService<InMemoryGateway>, Arc<InMemoryGateway>) {
    let gateway = Arc::new(InMemoryGateway::new());
    let service = MarketplaceService::new(gateway.clone(), MarketplaceConfig::default());
    (service, gateway)
}

pub(super) fn post<G: MarketplaceGateway + 'static>(
    service: &MarketplaceService<G>,
    required_workers: u32,
    preferred_date: Option<NaiveDate>,
) -> Job {
    service
        .post_job(farmer(), draft(required_workers, preferred_date), now())
        .expect("job posts")
}

/// Post a job and file `applicants` pending applications against it.
pub(super) fn job_with_applicants<G: MarketplaceGateway + 'static>(
    service: &MarketplaceService<G>,
    required_workers: u32,
    preferred_date: Option<NaiveDate>,
    applicants: usize,
) -> (Job, Vec<Application>) {
    let job = post(service, required_workers, preferred_date);
    let applications = (0..applicants)
        .map(|n| {
            service
                .apply(&job.id, worker(n), None, now())
                .expect("application accepted for review")
        })
        .collect();
    (job, applications)
}

/// Gateway wrapper with switchable faults.
#[derive(Default)]
pub(super) struct FlakyGateway {
    pub(super) inner: InMemoryGateway,
    pub(super) fail_status_writes: AtomicBool,
    pub(super) fail_application_updates: AtomicBool,
    pub(super) fail_application_deletes: AtomicBool,
    /// Worker another farmer session accepts just before our guarded write lands.
    pub(super) racing_worker: Mutex<Option<WorkerId>>,
    /// Application a worker submits just before a guarded wage write lands.
    pub(super) racing_application: Mutex<Option<Application>>,
    pub(super) fail_job_reads: AtomicBool,
    pub(super) fail_job_reads_after_acceptance: AtomicBool,
}

impl FlakyGateway {
    pub(super) fn fail_status_writes(&self, on: bool) {
        self.fail_status_writes.store(on, Ordering::SeqCst);
    }

    pub(super) fn fail_application_updates(&self, on: bool) {
        self.fail_application_updates.store(on, Ordering::SeqCst);
    }

    pub(super) fn fail_application_deletes(&self, on: bool) {
        self.fail_application_deletes.store(on, Ordering::SeqCst);
    }

    pub(super) fn race_with(&self, worker_id: WorkerId) {
        *self.racing_worker.lock().expect("race mutex poisoned") = Some(worker_id);
    }

    pub(super) fn race_application(&self, application: Application) {
        *self.racing_application.lock().expect("race mutex poisoned") = Some(application);
    }

    pub(super) fn lose_job_reads_after_acceptance(&self) {
        self.fail_job_reads_after_acceptance
            .store(true, Ordering::SeqCst);
    }
}

fn offline() -> GatewayError {
    GatewayError::Unavailable("database offline".to_string())
}

impl MarketplaceGateway for FlakyGateway {
    fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, GatewayError> {
        if self.fail_job_reads.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.inner.list_jobs(filter)
    }

    fn insert_job(&self, job: Job) -> Result<(), GatewayError> {
        self.inner.insert_job(job)
    }

    fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<(), GatewayError> {
        if patch.status.is_some() && self.fail_status_writes.load(Ordering::SeqCst) {
            return Err(offline());
        }
        if patch.if_application_count.is_some() {
            let racer = self
                .racing_application
                .lock()
                .expect("race mutex poisoned")
                .take();
            if let Some(application) = racer {
                self.inner.insert_application(application)?;
            }
        }
        if patch.if_accepted_count.is_some() {
            let racer = self.racing_worker.lock().expect("race mutex poisoned").take();
            if let Some(racer) = racer {
                let job = self.inner.fetch_job(id)?.ok_or(GatewayError::NotFound)?;
                let mut accepted = job.accepted_worker_ids;
                accepted.push(racer);
                self.inner.update_job(
                    id,
                    JobPatch {
                        accepted_worker_ids: Some(accepted),
                        ..JobPatch::default()
                    },
                )?;
            }
        }
        self.inner.update_job(id, patch)
    }

    fn delete_job(&self, id: &JobId) -> Result<(), GatewayError> {
        self.inner.delete_job(id)
    }

    fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, GatewayError> {
        self.inner.list_applications(filter)
    }

    fn insert_application(&self, application: Application) -> Result<(), GatewayError> {
        self.inner.insert_application(application)
    }

    fn update_application(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<(), GatewayError> {
        if self.fail_application_updates.load(Ordering::SeqCst) {
            return Err(offline());
        }
        let accepting = patch.status == Some(ApplicationStatus::Accepted);
        self.inner.update_application(id, patch)?;
        if accepting && self.fail_job_reads_after_acceptance.load(Ordering::SeqCst) {
            self.fail_job_reads.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn delete_applications_for_job(&self, job_id: &JobId) -> Result<(), GatewayError> {
        if self.fail_application_deletes.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.inner.delete_applications_for_job(job_id)
    }
}

pub(super) fn build_flaky_service() -> (MarketplaceService<FlakyGateway>, Arc<FlakyGateway>) {
    let gateway = Arc::new(FlakyGateway::default());
    let service = MarketplaceService::new(gateway.clone(), MarketplaceConfig::default());
    (service, gateway)
}

/// Holds the first two pair lookups until both callers have read, so both see no
/// existing application before either inserts.
pub(super) struct LockstepGateway {
    pub(super) inner: InMemoryGateway,
    barrier: Barrier,
    lookups: AtomicUsize,
}

impl LockstepGateway {
    pub(super) fn new() -> Self {
        Self {
            inner: InMemoryGateway::new(),
            barrier: Barrier::new(2),
            lookups: AtomicUsize::new(0),
        }
    }
}

impl MarketplaceGateway for LockstepGateway {
    fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, GatewayError> {
        self.inner.list_jobs(filter)
    }

    fn insert_job(&self, job: Job) -> Result<(), GatewayError> {
        self.inner.insert_job(job)
    }

    fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<(), GatewayError> {
        self.inner.update_job(id, patch)
    }

    fn delete_job(&self, id: &JobId) -> Result<(), GatewayError> {
        self.inner.delete_job(id)
    }

    fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, GatewayError> {
        let found = self.inner.list_applications(filter);
        if filter.worker_id.is_some() && self.lookups.fetch_add(1, Ordering::SeqCst) < 2 {
            self.barrier.wait();
        }
        found
    }

    fn insert_application(&self, application: Application) -> Result<(), GatewayError> {
        self.inner.insert_application(application)
    }

    fn update_application(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<(), GatewayError> {
        self.inner.update_application(id, patch)
    }

    fn delete_applications_for_job(&self, job_id: &JobId) -> Result<(), GatewayError> {
        self.inner.delete_applications_for_job(job_id)
    }
}

pub(super) struct UnavailableGateway;

impl MarketplaceGateway for UnavailableGateway {
    fn list_jobs(&self, _filter: &JobFilter) -> Result<Vec<Job>, GatewayError> {
        Err(offline())
    }

    fn insert_job(&self, _job: Job) -> Result<(), GatewayError> {
        Err(offline())
    }

    fn update_job(&self, _id: &JobId, _patch: JobPatch) -> Result<(), GatewayError> {
        Err(offline())
    }

    fn delete_job(&self, _id: &JobId) -> Result<(), GatewayError> {
        Err(offline())
    }

    fn list_applications(
        &self,
        _filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, GatewayError> {
        Err(offline())
    }

    fn insert_application(&self, _application: Application) -> Result<(), GatewayError> {
        Err(offline())
    }

    fn update_application(
        &self,
        _id: &ApplicationId,
        _patch: ApplicationPatch,
    ) -> Result<(), GatewayError> {
        Err(offline())
    }

    fn delete_applications_for_job(&self, _job_id: &JobId) -> Result<(), GatewayError> {
        Err(offline())
    }
}

pub(super) fn router_with_service(service: MarketplaceService<InMemoryGateway>) -> axum::Router {
    marketplace_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
