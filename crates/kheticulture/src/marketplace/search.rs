use serde::{Deserialize, Serialize};

use super::domain::{DurationType, Job, JobStatus};

/// Worker-facing job search. Text matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSearch {
    /// Matched against title, description and location.
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub max_wage: Option<i64>,
    #[serde(default)]
    pub duration_type: Option<DurationType>,
    #[serde(default)]
    pub location: Option<String>,
    /// `None` lists every status; workers browse open jobs by default.
    #[serde(default = "default_status")]
    pub status: Option<JobStatus>,
}

fn default_status() -> Option<JobStatus> {
    Some(JobStatus::Open)
}

impl Default for JobSearch {
    fn default() -> Self {
        Self {
            term: None,
            max_wage: None,
            duration_type: None,
            location: None,
            status: default_status(),
        }
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn folded(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

impl JobSearch {
    pub fn matches(&self, job: &Job) -> bool {
        if self.status.is_some_and(|status| job.status != status) {
            return false;
        }
        if let Some(term) = folded(&self.term) {
            let hit = contains_folded(&job.title, &term)
                || contains_folded(&job.description, &term)
                || contains_folded(&job.location, &term);
            if !hit {
                return false;
            }
        }
        if self.max_wage.is_some_and(|max| job.wage > max) {
            return false;
        }
        if self
            .duration_type
            .is_some_and(|duration_type| job.duration_type != duration_type)
        {
            return false;
        }
        if let Some(location) = folded(&self.location) {
            if !contains_folded(&job.location, &location) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, jobs: Vec<Job>) -> Vec<Job> {
        jobs.into_iter().filter(|job| self.matches(job)).collect()
    }
}
