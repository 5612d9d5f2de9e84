use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicationId, Decision, DurationType, FarmerId, FarmerRef, JobDraft, JobEdit, JobId,
    JobStatus, WorkerId, WorkerProfile,
};
use super::gateway::{ApplicationFilter, JobFilter, MarketplaceGateway};
use super::search::JobSearch;
use super::service::{ErrorKind, MarketplaceService, ServiceError};

/// Router builder exposing the job and application endpoints.
pub fn marketplace_router<G>(service: Arc<MarketplaceService<G>>) -> Router
where
    G: MarketplaceGateway + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            post(post_job_handler::<G>).get(list_jobs_handler::<G>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(get_job_handler::<G>)
                .patch(edit_job_handler::<G>)
                .delete(delete_job_handler::<G>),
        )
        .route(
            "/api/v1/jobs/:job_id/complete",
            post(complete_job_handler::<G>),
        )
        .route(
            "/api/v1/jobs/:job_id/wage-range",
            get(wage_range_handler::<G>),
        )
        .route(
            "/api/v1/jobs/:job_id/applications",
            post(apply_handler::<G>).get(job_applications_handler::<G>),
        )
        .route(
            "/api/v1/jobs/:job_id/applicants/:worker_id",
            get(applicant_view_handler::<G>),
        )
        .route(
            "/api/v1/applications/:application_id/decision",
            post(decision_handler::<G>),
        )
        .route("/api/v1/reconciliations", post(reconcile_handler::<G>))
        .route(
            "/api/v1/workers/:worker_id/stats",
            get(worker_stats_handler::<G>),
        )
        .route(
            "/api/v1/farmers/:farmer_id/stats",
            get(farmer_stats_handler::<G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct PostJobRequest {
    pub farmer: FarmerRef,
    #[serde(flatten)]
    pub draft: JobDraft,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    #[serde(flatten)]
    pub worker: WorkerProfile,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

/// Query string for `GET /api/v1/jobs`. A `farmer_id` lists that farmer's postings in
/// every status; otherwise the worker search applies.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub farmer_id: Option<String>,
    pub status: Option<JobStatus>,
    pub term: Option<String>,
    pub max_wage: Option<i64>,
    pub duration_type: Option<DurationType>,
    pub location: Option<String>,
    #[serde(default)]
    pub all_statuses: bool,
}

pub(crate) fn error_response(error: ServiceError) -> Response {
    let status = match error.kind() {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Policy => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Persistence => StatusCode::SERVICE_UNAVAILABLE,
    };

    let payload = match &error {
        ServiceError::Persistence(_) => json!({
            "error": "the job store is unavailable, please retry",
            "kind": error.kind(),
        }),
        ServiceError::Policy(violation) => json!({
            "error": error.to_string(),
            "kind": error.kind(),
            "violation": violation,
        }),
        _ => json!({
            "error": error.to_string(),
            "kind": error.kind(),
        }),
    };
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn post_job_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Json(request): Json<PostJobRequest>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(
        StatusCode::CREATED,
        service.post_job(request.farmer, request.draft, Utc::now()),
    )
}

pub(crate) async fn list_jobs_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Query(query): Query<JobListQuery>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    if let Some(farmer_id) = query.farmer_id {
        let mut filter = JobFilter::by_farmer(&FarmerId(farmer_id));
        filter.statuses = query.status.into_iter().collect();
        return respond(StatusCode::OK, service.jobs(filter));
    }

    let search = JobSearch {
        term: query.term,
        max_wage: query.max_wage,
        duration_type: query.duration_type,
        location: query.location,
        status: if query.all_statuses {
            None
        } else {
            Some(query.status.unwrap_or(JobStatus::Open))
        },
    };
    respond(StatusCode::OK, service.search(&search))
}

pub(crate) async fn get_job_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(job_id): Path<String>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(StatusCode::OK, service.job(&JobId(job_id)))
}

pub(crate) async fn edit_job_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(job_id): Path<String>,
    Json(edit): Json<JobEdit>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(
        StatusCode::OK,
        service.edit_job(&JobId(job_id), edit, Utc::now()),
    )
}

pub(crate) async fn delete_job_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(job_id): Path<String>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(StatusCode::OK, service.delete_job(&JobId(job_id)))
}

pub(crate) async fn wage_range_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(job_id): Path<String>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(StatusCode::OK, service.wage_range(&JobId(job_id)))
}

pub(crate) async fn complete_job_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(job_id): Path<String>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(
        StatusCode::OK,
        service.mark_completed(&JobId(job_id), Utc::now()),
    )
}

pub(crate) async fn apply_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(job_id): Path<String>,
    Json(request): Json<ApplyRequest>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(
        StatusCode::CREATED,
        service.apply(&JobId(job_id), request.worker, request.message, Utc::now()),
    )
}

pub(crate) async fn job_applications_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(job_id): Path<String>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    let job_id = JobId(job_id);
    let result = service
        .job(&job_id)
        .and_then(|_| service.applications(ApplicationFilter::for_job(&job_id)));
    respond(StatusCode::OK, result)
}

pub(crate) async fn applicant_view_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path((job_id, worker_id)): Path<(String, String)>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(
        StatusCode::OK,
        service.applicant_view(&JobId(job_id), &WorkerId(worker_id), Utc::now()),
    )
}

pub(crate) async fn decision_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(application_id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(
        StatusCode::OK,
        service.decide(
            &ApplicationId(application_id),
            request.decision,
            Utc::now(),
        ),
    )
}

pub(crate) async fn reconcile_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(StatusCode::OK, service.reconcile_statuses(Utc::now()))
}

pub(crate) async fn worker_stats_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(worker_id): Path<String>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(StatusCode::OK, service.worker_stats(&WorkerId(worker_id)))
}

pub(crate) async fn farmer_stats_handler<G>(
    State(service): State<Arc<MarketplaceService<G>>>,
    Path(farmer_id): Path<String>,
) -> Response
where
    G: MarketplaceGateway + 'static,
{
    respond(StatusCode::OK, service.farmer_stats(&FarmerId(farmer_id)))
}
