//! Service-level lifecycle: creation, deletion, and partial-result access.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use lf_app::{AppError, JobService, ServiceOptions};
use lf_core::{
    FieldSeries, JobStatus, ProfileSnapshot, SimulationConfig, SnapshotRecord,
};
use lf_engine::{
    CancelToken, EngineDirective, EngineOutcome, EngineProgress, EngineResult, SimulationEngine,
};
use lf_exec::NullObserver;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

/// Emits two snapshots, then holds until cancelled.
struct HoldingEngine;

impl SimulationEngine for HoldingEngine {
    fn run(
        &self,
        _config: &SimulationConfig,
        cancel: &CancelToken,
        emit: &mut dyn FnMut(EngineProgress) -> EngineDirective,
    ) -> EngineResult<EngineOutcome> {
        for step in 0..2 {
            let record = SnapshotRecord {
                time_s: step as f64,
                profile: ProfileSnapshot {
                    positions_m: vec![0.0, 1.0],
                    fields: vec![FieldSeries {
                        name: "temperature_k".to_string(),
                        values: vec![300.0, 301.0],
                    }],
                },
                derived: None,
            };
            if emit(EngineProgress { step, record }) == EngineDirective::Halt {
                return Ok(EngineOutcome::Stopped { steps: step });
            }
        }
        while !cancel.is_cancelled() {
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(EngineOutcome::Stopped { steps: 2 })
    }
}

fn service(engine: Arc<dyn SimulationEngine>, prefix: &str) -> JobService {
    JobService::new(
        unique_temp_dir(prefix),
        engine,
        ServiceOptions {
            cache_limit: 4,
            min_notify_interval: Duration::ZERO,
        },
    )
    .expect("service")
}

fn poll_until(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        if Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn create_job_persists_config_and_metadata() {
    let service = service(Arc::new(HoldingEngine), "lf_app_create");
    let config = SimulationConfig {
        cells: 30,
        ..SimulationConfig::default()
    };

    let job = service.create_job("bench A", config.clone()).expect("create");

    assert_eq!(job.status, JobStatus::Draft);
    assert_eq!(service.store().load_config(&job.id).expect("config"), config);
    assert!(service.storage_size(&job.id).expect("size") > 0);
    assert!(
        service
            .list_jobs()
            .expect("list")
            .iter()
            .any(|r| r.id == job.id)
    );
}

#[test]
fn create_job_rejects_invalid_config() {
    let service = service(Arc::new(HoldingEngine), "lf_app_badcfg");
    let config = SimulationConfig {
        dt_s: -1.0,
        ..SimulationConfig::default()
    };
    assert!(matches!(
        service.create_job("bad", config),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn run_of_unknown_job_is_rejected() {
    let service = service(Arc::new(HoldingEngine), "lf_app_norun");
    assert!(matches!(
        service.run("ghost", Box::new(NullObserver)),
        Err(AppError::JobNotFound(_))
    ));
}

#[test]
fn delete_is_refused_while_active_and_cancelled_results_stay_loadable() {
    let service = service(Arc::new(HoldingEngine), "lf_app_delete");
    let job = service
        .create_job("held", SimulationConfig::default())
        .expect("create");

    service
        .run(&job.id, Box::new(NullObserver))
        .expect("run accepted");
    poll_until("snapshots persisted", || {
        service
            .job(&job.id)
            .map(|r| r.summaries.len() == 2)
            .unwrap_or(false)
    });

    assert!(matches!(
        service.delete_job(&job.id),
        Err(AppError::JobActive(_))
    ));

    service.cancel(&job.id).expect("cancel");
    assert_eq!(service.wait(&job.id), Some(JobStatus::Cancelled));

    // Partial results from the cancelled run remain loadable.
    let dataset = service.load_for_display(&job.id).expect("load");
    assert_eq!(dataset.times_s, vec![0.0, 1.0]);
    assert_eq!(
        service.job(&job.id).expect("job").status,
        JobStatus::Cancelled
    );

    service.delete_job(&job.id).expect("delete");
    assert!(matches!(service.job(&job.id), Err(AppError::JobNotFound(_))));
    assert_eq!(service.storage_size(&job.id).expect("size"), 0);
    assert!(matches!(
        service.load_for_display(&job.id),
        Err(AppError::JobNotFound(_))
    ));
}
