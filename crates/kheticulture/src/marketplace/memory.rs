use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{Application, ApplicationId, Job, JobId};
use super::gateway::{
    ApplicationFilter, ApplicationPatch, GatewayError, JobFilter, JobPatch, MarketplaceGateway,
};

/// Process-local gateway used by the API binary, the demo and the tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryGateway {
    jobs: Arc<Mutex<Vec<Job>>>,
    applications: Arc<Mutex<Vec<Application>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, GatewayError> {
    mutex
        .lock()
        .map_err(|_| GatewayError::Unavailable("in-memory store lock poisoned".to_string()))
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_count(&self) -> usize {
        lock(&self.jobs).map(|jobs| jobs.len()).unwrap_or(0)
    }

    pub fn application_count(&self) -> usize {
        lock(&self.applications)
            .map(|applications| applications.len())
            .unwrap_or(0)
    }
}

impl MarketplaceGateway for InMemoryGateway {
    fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, GatewayError> {
        let guard = lock(&self.jobs)?;
        // Reverse insertion order first so equal timestamps still list newest first.
        let mut jobs: Vec<Job> = guard
            .iter()
            .rev()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            jobs.truncate(limit);
        }
        Ok(jobs)
    }

    fn insert_job(&self, job: Job) -> Result<(), GatewayError> {
        let mut guard = lock(&self.jobs)?;
        if guard.iter().any(|existing| existing.id == job.id) {
            return Err(GatewayError::Conflict);
        }
        guard.push(job);
        Ok(())
    }

    fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<(), GatewayError> {
        let mut guard = lock(&self.jobs)?;
        let job = guard
            .iter_mut()
            .find(|job| &job.id == id)
            .ok_or(GatewayError::NotFound)?;
        if let Some(expected) = patch.if_accepted_count {
            if job.accepted_count() != expected {
                return Err(GatewayError::Conflict);
            }
        }
        if let Some(expected) = patch.if_application_count {
            // Jobs lock is held, so applications are always taken second.
            let applications = lock(&self.applications)?;
            let count = applications
                .iter()
                .filter(|application| &application.job_id == id)
                .count();
            if count != expected {
                return Err(GatewayError::Conflict);
            }
        }
        patch.apply_to(job);
        Ok(())
    }

    fn delete_job(&self, id: &JobId) -> Result<(), GatewayError> {
        let mut guard = lock(&self.jobs)?;
        let before = guard.len();
        guard.retain(|job| &job.id != id);
        if guard.len() == before {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, GatewayError> {
        let guard = lock(&self.applications)?;
        let mut applications: Vec<Application> = guard
            .iter()
            .rev()
            .filter(|application| filter.matches(application))
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        if let Some(limit) = filter.limit {
            applications.truncate(limit);
        }
        Ok(applications)
    }

    fn insert_application(&self, application: Application) -> Result<(), GatewayError> {
        let mut guard = lock(&self.applications)?;
        if guard.iter().any(|existing| {
            existing.id == application.id
                || (existing.job_id == application.job_id
                    && existing.worker_id == application.worker_id)
        }) {
            return Err(GatewayError::Conflict);
        }
        guard.push(application);
        Ok(())
    }

    fn update_application(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<(), GatewayError> {
        let mut guard = lock(&self.applications)?;
        let application = guard
            .iter_mut()
            .find(|application| &application.id == id)
            .ok_or(GatewayError::NotFound)?;
        patch.apply_to(application);
        Ok(())
    }

    fn delete_applications_for_job(&self, job_id: &JobId) -> Result<(), GatewayError> {
        let mut guard = lock(&self.applications)?;
        guard.retain(|application| &application.job_id != job_id);
        Ok(())
    }
}
