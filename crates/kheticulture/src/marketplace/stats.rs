use serde::Serialize;

use super::domain::{Application, ApplicationStatus, FarmerId, Job, JobStatus, WorkerId};

/// Track record shown to farmers when reviewing an applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub worker_id: WorkerId,
    pub total_applications: usize,
    pub accepted_applications: usize,
    pub jobs_completed: usize,
    /// Completed jobs as a rounded percentage of all applications.
    pub success_rate: u8,
}

impl WorkerStats {
    pub fn collect(worker_id: &WorkerId, applications: &[Application], jobs: &[Job]) -> Self {
        let mine: Vec<&Application> = applications
            .iter()
            .filter(|application| &application.worker_id == worker_id)
            .collect();
        let accepted: Vec<&Application> = mine
            .iter()
            .copied()
            .filter(|application| application.status == ApplicationStatus::Accepted)
            .collect();
        let jobs_completed = accepted
            .iter()
            .filter(|application| {
                jobs.iter().any(|job| {
                    job.id == application.job_id && job.status == JobStatus::Completed
                })
            })
            .count();

        Self {
            worker_id: worker_id.clone(),
            total_applications: mine.len(),
            accepted_applications: accepted.len(),
            jobs_completed,
            success_rate: success_rate(jobs_completed, mine.len()),
        }
    }
}

fn success_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (completed as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Summary of a farmer's postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FarmerStats {
    pub farmer_id: FarmerId,
    pub jobs_posted: usize,
    pub workers_hired: usize,
    pub open: usize,
    pub filled: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl FarmerStats {
    pub fn collect(farmer_id: &FarmerId, jobs: &[Job]) -> Self {
        let mut stats = Self {
            farmer_id: farmer_id.clone(),
            jobs_posted: 0,
            workers_hired: 0,
            open: 0,
            filled: 0,
            in_progress: 0,
            completed: 0,
        };
        for job in jobs.iter().filter(|job| &job.farmer_id == farmer_id) {
            stats.jobs_posted += 1;
            stats.workers_hired += job.accepted_count();
            match job.status {
                JobStatus::Open => stats.open += 1,
                JobStatus::Filled => stats.filled += 1,
                JobStatus::InProgress => stats.in_progress += 1,
                JobStatus::Completed => stats.completed += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::domain::{ApplicationId, DurationType, JobId};
    use chrono::{TimeZone, Utc};

    fn job(id: &str, farmer: &str, status: JobStatus, accepted: &[&str]) -> Job {
        Job {
            id: JobId(id.to_string()),
            farmer_id: FarmerId(farmer.to_string()),
            farmer_name: "Bishnu".to_string(),
            title: "Potato digging".to_string(),
            description: "Two terraces".to_string(),
            location: "Kavre".to_string(),
            preferred_date: None,
            duration: 1,
            duration_type: DurationType::Days,
            wage: 1000,
            required_workers: 3,
            accepted_worker_ids: accepted
                .iter()
                .map(|id| WorkerId(id.to_string()))
                .collect(),
            status,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn application(id: &str, job: &str, worker: &str, status: ApplicationStatus) -> Application {
        Application {
            id: ApplicationId(id.to_string()),
            job_id: JobId(job.to_string()),
            worker_id: WorkerId(worker.to_string()),
            worker_name: "Kamal".to_string(),
            worker_email: "kamal@example.com".to_string(),
            message: None,
            status,
            applied_at: Utc.with_ymd_and_hms(2025, 3, 2, 7, 0, 0).unwrap(),
            rejected_at: None,
        }
    }

    #[test]
    fn worker_success_rate_counts_completed_jobs_over_all_applications() {
        let jobs = vec![
            job("j1", "f1", JobStatus::Completed, &["w1"]),
            job("j2", "f1", JobStatus::InProgress, &["w1"]),
            job("j3", "f2", JobStatus::Open, &[]),
        ];
        let applications = vec![
            application("a1", "j1", "w1", ApplicationStatus::Accepted),
            application("a2", "j2", "w1", ApplicationStatus::Accepted),
            application("a3", "j3", "w1", ApplicationStatus::Rejected),
            application("a4", "j3", "w2", ApplicationStatus::Pending),
        ];

        let stats = WorkerStats::collect(&WorkerId("w1".to_string()), &applications, &jobs);
        assert_eq!(stats.total_applications, 3);
        assert_eq!(stats.accepted_applications, 2);
        assert_eq!(stats.jobs_completed, 1);
        assert_eq!(stats.success_rate, 33);
    }

    #[test]
    fn worker_without_applications_has_zero_rate() {
        let stats = WorkerStats::collect(&WorkerId("nobody".to_string()), &[], &[]);
        assert_eq!(stats.success_rate, 0);
    }

    #[test]
    fn farmer_stats_sum_hired_workers_and_statuses() {
        let jobs = vec![
            job("j1", "f1", JobStatus::Completed, &["w1", "w2"]),
            job("j2", "f1", JobStatus::Open, &["w3"]),
            job("j3", "f2", JobStatus::Filled, &["w4"]),
        ];
        let stats = FarmerStats::collect(&FarmerId("f1".to_string()), &jobs);
        assert_eq!(stats.jobs_posted, 2);
        assert_eq!(stats.workers_hired, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.open, 1);
        assert_eq!(stats.filled, 0);
    }
}
