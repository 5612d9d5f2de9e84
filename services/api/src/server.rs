use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use kheticulture::config::AppConfig;
use kheticulture::error::AppError;
use kheticulture::marketplace::{InMemoryGateway, MarketplaceGateway, MarketplaceService};
use kheticulture::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let gateway = Arc::new(InMemoryGateway::new());
    let interval = config.marketplace.reconcile_interval_secs;
    let marketplace = Arc::new(MarketplaceService::new(gateway, config.marketplace.clone()));
    if interval > 0 {
        spawn_reconciliation(marketplace.clone(), Duration::from_secs(interval));
    }

    let app = with_marketplace_routes(marketplace)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "kheticulture marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Background pass that advances jobs whose preferred date arrived without any acceptance
/// triggering a recheck.
fn spawn_reconciliation<G>(service: Arc<MarketplaceService<G>>, every: Duration)
where
    G: MarketplaceGateway + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match service.reconcile_statuses(Utc::now()) {
                Ok(report) => debug!(
                    examined = report.examined,
                    advanced = report.advanced.len(),
                    failed = report.failed.len(),
                    "reconciliation pass finished"
                ),
                Err(err) => warn!(error = %err, "reconciliation pass failed"),
            }
        }
    });
}
