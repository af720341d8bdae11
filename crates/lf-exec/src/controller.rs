//! Execution controller: exclusive run lifecycle per job id.
//!
//! `run` claims ownership and spawns a worker thread; the worker is the only
//! writer to the job's data file and metadata for the duration of the run.
//! Every engine snapshot is persisted and summarized before the observer is
//! notified; only observer notification is throttled, never persistence.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use lf_cache::ResultCache;
use lf_core::{JobId, JobRecord, JobStatus, SimulationConfig, SnapshotSummary, config_fingerprint};
use lf_engine::{CancelToken, EngineDirective, EngineOutcome, EngineProgress, SimulationEngine};
use lf_store::SnapshotStore;

use crate::metadata::MetadataStore;
use crate::observer::{ProgressUpdate, RunObserver};
use crate::throttle::ProgressThrottle;
use crate::{ExecError, ExecResult};

/// Tuning for the controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Minimum interval between observer progress notifications
    pub min_notify_interval: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            min_notify_interval: Duration::from_millis(100),
        }
    }
}

struct RunSignals {
    cancel: CancelToken,
    paused: Arc<AtomicBool>,
}

#[derive(Default)]
struct Registry {
    /// Jobs currently owned by a run (Running or Paused)
    active: HashMap<JobId, RunSignals>,
    /// Terminal status of each job's most recent run
    outcomes: HashMap<JobId, JobStatus>,
}

pub struct ExecutionController {
    engine: Arc<dyn SimulationEngine>,
    store: SnapshotStore,
    metadata: Arc<dyn MetadataStore>,
    cache: Arc<ResultCache>,
    options: ControllerOptions,
    registry: Arc<(Mutex<Registry>, Condvar)>,
}

impl ExecutionController {
    pub fn new(
        engine: Arc<dyn SimulationEngine>,
        store: SnapshotStore,
        metadata: Arc<dyn MetadataStore>,
        cache: Arc<ResultCache>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            engine,
            store,
            metadata,
            cache,
            options,
            registry: Arc::new((Mutex::new(Registry::default()), Condvar::new())),
        }
    }

    /// Start a run for `job_id`.
    ///
    /// Returns as soon as ownership is claimed; the run proceeds on its own
    /// worker thread. Rejections (`AlreadyRunning`, `InvalidConfiguration`)
    /// are synchronous and leave all state untouched.
    pub fn run(
        &self,
        job_id: &str,
        config: SimulationConfig,
        observer: Box<dyn RunObserver>,
    ) -> ExecResult<()> {
        config.validate()?;

        let cancel = CancelToken::new();
        let paused = Arc::new(AtomicBool::new(false));

        {
            let (lock, _) = &*self.registry;
            let mut registry = lock.lock().expect("controller lock poisoned");
            if registry.active.contains_key(job_id) {
                return Err(ExecError::AlreadyRunning {
                    job_id: job_id.to_string(),
                });
            }
            registry.active.insert(
                job_id.to_string(),
                RunSignals {
                    cancel: cancel.clone(),
                    paused: Arc::clone(&paused),
                },
            );
            registry.outcomes.remove(job_id);
        }

        let worker = RunWorker {
            job_id: job_id.to_string(),
            config,
            engine: Arc::clone(&self.engine),
            store: self.store.clone(),
            metadata: Arc::clone(&self.metadata),
            cache: Arc::clone(&self.cache),
            min_notify_interval: self.options.min_notify_interval,
            cancel,
            paused,
            registry: Arc::clone(&self.registry),
            observer,
        };
        thread::spawn(move || worker.execute());
        Ok(())
    }

    /// Signal the run to stop gating observer notifications.
    ///
    /// The engine keeps advancing and persistence continues; the worker
    /// applies the `Paused` status at its next checkpoint.
    pub fn pause(&self, job_id: &str) -> ExecResult<()> {
        self.with_signals(job_id, |signals| {
            signals.paused.store(true, Ordering::Relaxed);
        })
    }

    pub fn resume(&self, job_id: &str) -> ExecResult<()> {
        self.with_signals(job_id, |signals| {
            signals.paused.store(false, Ordering::Relaxed);
        })
    }

    /// Request cooperative cancellation; the engine stops at its next
    /// checkpoint and everything persisted so far stays durable.
    pub fn cancel(&self, job_id: &str) -> ExecResult<()> {
        self.with_signals(job_id, |signals| signals.cancel.cancel())
    }

    pub fn is_active(&self, job_id: &str) -> bool {
        let (lock, _) = &*self.registry;
        let registry = lock.lock().expect("controller lock poisoned");
        registry.active.contains_key(job_id)
    }

    /// Block until the job has no active run; returns the terminal status of
    /// its most recent run, or `None` if it never ran.
    pub fn wait(&self, job_id: &str) -> Option<JobStatus> {
        let (lock, cvar) = &*self.registry;
        let mut registry = lock.lock().expect("controller lock poisoned");
        while registry.active.contains_key(job_id) {
            registry = cvar.wait(registry).expect("controller lock poisoned");
        }
        registry.outcomes.get(job_id).cloned()
    }

    fn with_signals(&self, job_id: &str, f: impl FnOnce(&RunSignals)) -> ExecResult<()> {
        let (lock, _) = &*self.registry;
        let registry = lock.lock().expect("controller lock poisoned");
        match registry.active.get(job_id) {
            Some(signals) => {
                f(signals);
                Ok(())
            }
            None => Err(ExecError::NotActive {
                job_id: job_id.to_string(),
            }),
        }
    }
}

/// Everything one run needs, moved onto its worker thread.
struct RunWorker {
    job_id: JobId,
    config: SimulationConfig,
    engine: Arc<dyn SimulationEngine>,
    store: SnapshotStore,
    metadata: Arc<dyn MetadataStore>,
    cache: Arc<ResultCache>,
    min_notify_interval: Duration,
    cancel: CancelToken,
    paused: Arc<AtomicBool>,
    registry: Arc<(Mutex<Registry>, Condvar)>,
    observer: Box<dyn RunObserver>,
}

impl RunWorker {
    fn execute(mut self) {
        let status = match self.drive() {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(job_id = %self.job_id, %err, "run failed");
                JobStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };

        if let Err(err) = self.metadata.set_status(&self.job_id, status.clone()) {
            tracing::warn!(job_id = %self.job_id, %err, "failed to record terminal status");
        }
        // A finished run supersedes whatever dataset was cached for the job.
        self.cache.invalidate(&self.job_id);

        let error = match &status {
            JobStatus::Failed { reason } => Some(reason.as_str()),
            _ => None,
        };
        self.observer.on_terminal(&status, error);
        tracing::info!(job_id = %self.job_id, %status, "run finished");

        let (lock, cvar) = &*self.registry;
        let mut registry = lock.lock().expect("controller lock poisoned");
        registry.outcomes.insert(self.job_id.clone(), status);
        registry.active.remove(&self.job_id);
        cvar.notify_all();
    }

    fn drive(&mut self) -> ExecResult<JobStatus> {
        let started = Instant::now();

        // A re-run starts from scratch: stale frames, summaries, and any
        // cached dataset go away before the engine produces anything.
        self.store.ensure_job_dir(&self.job_id)?;
        self.store.reset_snapshots(&self.job_id)?;
        self.store.save_config(&self.job_id, &self.config)?;
        self.ensure_job_record()?;
        self.metadata.clear_summaries(&self.job_id)?;
        self.metadata.set_status(&self.job_id, JobStatus::Running)?;
        self.cache.invalidate(&self.job_id);

        tracing::info!(job_id = %self.job_id, "run started");

        let mut throttle = ProgressThrottle::new(self.min_notify_interval);
        let mut sequence_index: u64 = 0;
        let mut sink_error: Option<ExecError> = None;
        let mut paused_applied = false;

        let store = self.store.clone();
        let metadata = Arc::clone(&self.metadata);
        let job_id = self.job_id.clone();
        let paused = Arc::clone(&self.paused);
        let observer = &mut self.observer;

        let mut emit = |progress: EngineProgress| -> EngineDirective {
            // Persist first; a snapshot only counts once its frame is
            // durable and summarized.
            if let Err(err) = store.append_snapshot(&job_id, &progress.record) {
                sink_error = Some(ExecError::Store(err));
                return EngineDirective::Halt;
            }
            let summary = SnapshotSummary::from_record(&progress.record, sequence_index);
            if let Err(err) = metadata.append_summary(&job_id, summary.clone()) {
                sink_error = Some(ExecError::Metadata(err));
                return EngineDirective::Halt;
            }
            sequence_index += 1;

            // The worker is the sole status writer; pause/resume flags are
            // applied here, at the engine's checkpoint.
            let now_paused = paused.load(Ordering::Relaxed);
            if now_paused != paused_applied {
                paused_applied = now_paused;
                let status = if now_paused {
                    JobStatus::Paused
                } else {
                    JobStatus::Running
                };
                if let Err(err) = metadata.set_status(&job_id, status) {
                    sink_error = Some(ExecError::Metadata(err));
                    return EngineDirective::Halt;
                }
            }

            if !now_paused && throttle.admit(Instant::now()) {
                observer.on_progress(&ProgressUpdate {
                    job_id: job_id.clone(),
                    summary,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                });
            }
            EngineDirective::Continue
        };

        let outcome = self.engine.run(&self.config, &self.cancel, &mut emit);

        if let Some(err) = sink_error {
            return Err(err);
        }

        match outcome {
            Ok(EngineOutcome::Completed { steps }) => {
                tracing::info!(job_id = %self.job_id, steps, "engine completed");
                Ok(JobStatus::Completed)
            }
            Ok(EngineOutcome::Stopped { steps }) => {
                tracing::info!(job_id = %self.job_id, steps, "engine stopped at checkpoint");
                Ok(JobStatus::Cancelled)
            }
            Err(err) => Ok(JobStatus::Failed {
                reason: err.to_string(),
            }),
        }
    }

    /// Make sure the metadata store has a row for this job, refreshed with
    /// the config this run actually uses.
    fn ensure_job_record(&self) -> ExecResult<()> {
        match self.metadata.get(&self.job_id)? {
            Some(mut record) => {
                record.config = self.config.clone();
                record.config_fingerprint = config_fingerprint(&self.config);
                self.metadata.update(record)?;
            }
            None => {
                let now = chrono::Utc::now().to_rfc3339();
                self.metadata.insert(JobRecord {
                    id: self.job_id.clone(),
                    name: self.job_id.clone(),
                    status: JobStatus::Draft,
                    config_fingerprint: config_fingerprint(&self.config),
                    config: self.config.clone(),
                    summaries: Vec::new(),
                    data_dir: self.store.root_dir().join(&self.job_id),
                    created_at: now.clone(),
                    updated_at: now,
                })?;
            }
        }
        Ok(())
    }
}
