//! Job lifecycle and application matching for the farm labour marketplace.
//!
//! Farmers post jobs, workers apply, farmers accept or reject. The policies here keep a
//! job from taking more workers than it asked for, freeze the wage once anyone applied,
//! hold rejected workers to a reapplication cooldown and walk job status forward.

pub mod domain;
pub mod gateway;
pub mod memory;
pub mod policy;
pub mod router;
pub mod search;
pub mod service;
pub mod stats;
pub mod status;
pub mod violation;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, Decision, DurationType, FarmerId, FarmerRef,
    Job, JobDraft, JobEdit, JobId, JobStatus, WorkerId, WorkerProfile,
};
pub use gateway::{
    ApplicationFilter, ApplicationPatch, GatewayError, JobFilter, JobPatch, MarketplaceGateway,
};
pub use memory::InMemoryGateway;
pub use policy::{validate_wage_change, wage_bounds, CooldownPolicy, WageDecision};
pub use router::marketplace_router;
pub use search::JobSearch;
pub use service::{
    ApplicantView, DecisionOutcome, DeletionSummary, ErrorKind, MarketplaceService,
    ReconciliationReport, ServiceError, WageRange,
};
pub use stats::{FarmerStats, WorkerStats};
pub use status::{next_status, plan_reconciliation, recompute, StatusDelta};
pub use violation::{PolicyViolation, ValidationError};
