use crate::infra::{at_hour, parse_date};
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use clap::Args;
use kheticulture::config::MarketplaceConfig;
use kheticulture::error::AppError;
use kheticulture::marketplace::{
    ApplicationFilter, Decision, DurationType, FarmerId, FarmerRef, InMemoryGateway, Job,
    JobDraft, JobEdit, JobFilter, MarketplaceService, ReconciliationReport, WorkerId,
    WorkerProfile,
};
use std::sync::Arc;

type DemoService = MarketplaceService<InMemoryGateway>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Day the walkthrough starts on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Positions on the demo harvest job.
    #[arg(long, default_value_t = 2)]
    pub(crate) positions: u32,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReconcileArgs {
    /// Evaluation date for the pass (defaults to today).
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

fn demo_service() -> DemoService {
    MarketplaceService::new(Arc::new(InMemoryGateway::new()), MarketplaceConfig::default())
}

fn farmer(id: &str, name: &str) -> FarmerRef {
    FarmerRef {
        id: FarmerId(id.to_string()),
        name: name.to_string(),
    }
}

fn worker(name: &str) -> WorkerProfile {
    let handle = name.to_lowercase();
    WorkerProfile {
        worker_id: WorkerId(format!("worker-{handle}")),
        name: name.to_string(),
        email: format!("{handle}@example.com"),
    }
}

fn draft(title: &str, location: &str, date: NaiveDate, wage: i64, positions: u32) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: format!("{title} near {location}, meals provided"),
        location: location.to_string(),
        preferred_date: Some(date),
        wage,
        duration: 1,
        duration_type: DurationType::Days,
        required_workers: positions,
    }
}

fn describe(job: &Job) -> String {
    format!(
        "{} [{}] {}/{} accepted, {} per {}",
        job.title,
        job.status,
        job.accepted_count(),
        job.required_workers,
        job.wage,
        job.duration_type.label().trim_end_matches('s')
    )
}

const APPLICANTS: [&str; 5] = ["Asha", "Bikash", "Chandra", "Dipa", "Ekta"];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start = args.start.unwrap_or_else(|| Local::now().date_naive());
    let morning = at_hour(start, 8);
    let harvest_day = start + Duration::days(2);
    let service = demo_service();

    println!("Kheticulture marketplace demo");
    let job = service.post_job(
        farmer("farmer-bishnu", "Bishnu Rai"),
        draft("Millet harvest", "Ilam", harvest_day, 1500, args.positions),
        morning,
    )?;
    println!("\nPosted {} for {harvest_day}", describe(&job));

    let count = (args.positions as usize + 1).min(APPLICANTS.len());
    let mut applications = Vec::with_capacity(count);
    for name in &APPLICANTS[..count] {
        let application = service.apply(&job.id, worker(name), None, morning)?;
        println!("  {name} applied ({})", application.id);
        applications.push(application);
    }

    let raise = JobEdit {
        wage: Some(1800),
        ..JobEdit::default()
    };
    match service.edit_job(&job.id, raise, morning) {
        Ok(job) => println!("\nWage raised: {}", describe(&job)),
        Err(err) => println!("\nWage raise refused: {err}"),
    }

    println!("\nDecisions");
    let decided_at = morning + Duration::hours(2);
    for application in &applications {
        match service.decide(&application.id, Decision::Accept, decided_at) {
            Ok(outcome) => println!(
                "  accepted {} -> {}",
                outcome.application.worker_name,
                describe(&outcome.job)
            ),
            Err(err) => {
                println!("  could not accept {}: {err}", application.worker_name);
                service.decide(&application.id, Decision::Reject, decided_at)?;
                println!("  rejected {}", application.worker_name);
            }
        }
    }

    if let Some(last) = applications.last() {
        let retry_at = decided_at + Duration::hours(3);
        match service.apply(&job.id, worker(&last.worker_name), None, retry_at) {
            Ok(_) => println!("\n{} reapplied", last.worker_name),
            Err(err) => println!("\n{} tried again three hours later: {err}", last.worker_name),
        }
    }

    let report = service.reconcile_statuses(at_hour(harvest_day, 6))?;
    println!("\nMorning of {harvest_day}");
    render_report(&report);

    match service.mark_completed(&job.id, at_hour(harvest_day, 18)) {
        Ok(job) => println!("\nClosed {}", describe(&job)),
        Err(err) => println!("\nCould not close the job: {err}"),
    }

    println!("\nWorker records");
    for application in &applications {
        let stats = service.worker_stats(&application.worker_id)?;
        println!(
            "  {}: {} application(s), {} completed, {}% success",
            application.worker_name,
            stats.total_applications,
            stats.jobs_completed,
            stats.success_rate
        );
    }

    let left = service.applications(ApplicationFilter::for_job(&job.id))?;
    println!("\n{} application record(s) kept on file", left.len());
    Ok(())
}

pub(crate) fn run_reconcile(args: ReconcileArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let service = demo_service();
    seed_marketplace(&service, today)?;

    println!("Job status reconciliation for {today}");
    let before = service.jobs(JobFilter::active())?;
    for job in &before {
        println!("  {}", describe(job));
    }

    let report = service.reconcile_statuses(at_hour(today, 6))?;
    render_report(&report);
    Ok(())
}

/// Jobs posted three days back, with acceptances recorded before any of them came due.
fn seed_marketplace(service: &DemoService, today: NaiveDate) -> Result<(), AppError> {
    let seeded_at: DateTime<Utc> = at_hour(today - Duration::days(3), 9);
    let owner = farmer("farmer-sita", "Sita Tharu");
    let postings = [
        ("Paddy transplanting", "Chitwan", today, 2, 1),
        ("Mustard threshing", "Bardiya", today + Duration::days(1), 1, 1),
        ("Tea plucking", "Ilam", today - Duration::days(1), 1, 1),
        ("Orange picking", "Syangja", today + Duration::days(5), 3, 0),
    ];

    for (index, (title, location, date, positions, hires)) in postings.into_iter().enumerate() {
        let job = service.post_job(
            owner.clone(),
            draft(title, location, date, 1000, positions),
            seeded_at,
        )?;
        for hire in 0..hires {
            let name = APPLICANTS[(index + hire) % APPLICANTS.len()];
            let application = service.apply(&job.id, worker(name), None, seeded_at)?;
            service.decide(&application.id, Decision::Accept, seeded_at)?;
        }
    }
    Ok(())
}

fn render_report(report: &ReconciliationReport) {
    println!(
        "  examined {} job(s), advanced {}, failed {}",
        report.examined,
        report.advanced.len(),
        report.failed.len()
    );
    for delta in &report.advanced {
        println!("  - {}: {} -> {}", delta.job_id, delta.from, delta.to);
    }
    for delta in &report.failed {
        println!("  ! {} stuck at {} (wanted {})", delta.job_id, delta.from, delta.to);
    }
}
