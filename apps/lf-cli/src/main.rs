use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use lf_app::{
    AppResult, JobService, ServiceOptions, dataset_summary, extract_cell_series,
    extract_derived_series,
};
use lf_cache::Dataset;
use lf_core::{JobStatus, SimulationConfig};
use lf_engine::DiffusionEngine;
use lf_exec::{ProgressUpdate, RunObserver};
use lf_store::SnapshotStore;

#[derive(Parser)]
#[command(name = "lf-cli")]
#[command(about = "labflow CLI - simulation job runner and result browser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a job and run the built-in diffusion engine to completion
    Run {
        /// Storage root directory
        root: PathBuf,
        /// Display name for the job
        #[arg(long, default_value = "diffusion job")]
        name: String,
        /// Number of spatial cells
        #[arg(long, default_value_t = 50)]
        cells: usize,
        /// Time step in seconds
        #[arg(long, default_value_t = 1.0)]
        dt: f64,
        /// End time in seconds
        #[arg(long, default_value_t = 100.0)]
        t_end: f64,
        /// Snapshot decimation (every N-th step)
        #[arg(long, default_value_t = 10)]
        record_every: usize,
        /// Minimum milliseconds between progress updates
        #[arg(long, default_value_t = 100)]
        throttle_ms: u64,
    },
    /// List jobs stored under a root
    Jobs {
        /// Storage root directory
        root: PathBuf,
    },
    /// Show details of a stored job
    Show {
        /// Storage root directory
        root: PathBuf,
        /// Job ID to display
        job_id: String,
    },
    /// Export one cell's time series as CSV
    Export {
        /// Storage root directory
        root: PathBuf,
        /// Job ID
        job_id: String,
        /// Field name (e.g. temperature_k)
        field: String,
        /// Cell index
        cell: usize,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report on-disk size of a job
    Size {
        /// Storage root directory
        root: PathBuf,
        /// Job ID
        job_id: String,
    },
    /// Delete a stored job
    Delete {
        /// Storage root directory
        root: PathBuf,
        /// Job ID
        job_id: String,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            root,
            name,
            cells,
            dt,
            t_end,
            record_every,
            throttle_ms,
        } => cmd_run(root, &name, cells, dt, t_end, record_every, throttle_ms),
        Commands::Jobs { root } => cmd_jobs(root),
        Commands::Show { root, job_id } => cmd_show(root, &job_id),
        Commands::Export {
            root,
            job_id,
            field,
            cell,
            output,
        } => cmd_export(root, &job_id, &field, cell, output.as_deref()),
        Commands::Size { root, job_id } => cmd_size(root, &job_id),
        Commands::Delete { root, job_id } => cmd_delete(root, &job_id),
    }
}

struct CliProgress {
    t_end_s: f64,
}

impl RunObserver for CliProgress {
    fn on_progress(&mut self, update: &ProgressUpdate) {
        let fraction = if self.t_end_s > 0.0 {
            (update.summary.time_s / self.t_end_s).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let width = 28usize;
        let filled = ((fraction * width as f64).round() as usize).min(width);
        let bar = format!(
            "{}{}",
            "#".repeat(filled),
            "-".repeat(width.saturating_sub(filled))
        );
        print!(
            "\r[{}] {:>6.2}%  t={:.3}s  snapshot #{}  elapsed={:.1}s",
            bar,
            fraction * 100.0,
            update.summary.time_s,
            update.summary.sequence_index,
            update.elapsed_wall_s
        );
        let _ = io::stdout().flush();
    }

    fn on_terminal(&mut self, status: &JobStatus, error: Option<&str>) {
        println!();
        match error {
            Some(message) => println!("✗ Run ended: {} ({})", status, message),
            None => println!("✓ Run ended: {}", status),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    root: PathBuf,
    name: &str,
    cells: usize,
    dt: f64,
    t_end: f64,
    record_every: usize,
    throttle_ms: u64,
) -> AppResult<()> {
    let service = JobService::new(
        root,
        Arc::new(DiffusionEngine),
        ServiceOptions {
            cache_limit: 8,
            min_notify_interval: Duration::from_millis(throttle_ms),
        },
    )?;

    let config = SimulationConfig {
        cells,
        dt_s: dt,
        t_end_s: t_end,
        record_every,
        ..SimulationConfig::default()
    };
    let job = service.create_job(name, config)?;
    println!("Created job {} ({})", job.id, job.name);
    println!("  cells = {}, dt = {:.3} s, t_end = {:.3} s", cells, dt, t_end);

    service.run(
        &job.id,
        Box::new(CliProgress { t_end_s: t_end }),
    )?;
    let status = service.wait(&job.id);

    if status == Some(JobStatus::Completed) {
        let dataset = service.load_for_display(&job.id)?;
        let summary = dataset_summary(&dataset)?;
        println!("  Snapshots:  {}", summary.snapshot_count);
        println!(
            "  Time range: {:.3} - {:.3} s",
            summary.time_range.0, summary.time_range.1
        );
        println!("  Fields:     {}", summary.field_names.join(", "));
        println!("  On disk:    {} bytes", service.storage_size(&job.id)?);
    }

    Ok(())
}

fn cmd_jobs(root: PathBuf) -> AppResult<()> {
    let store = SnapshotStore::new(root)?;
    let jobs = store.list_jobs()?;

    if jobs.is_empty() {
        println!("No jobs found");
    } else {
        println!("Stored jobs:");
        for job_id in jobs {
            let config = store.load_config(&job_id)?;
            println!(
                "  {} ({} cells, t_end = {:.3} s, {} bytes)",
                job_id,
                config.cells,
                config.t_end_s,
                store.storage_size(&job_id)?
            );
        }
    }
    Ok(())
}

fn load_dataset(store: &SnapshotStore, job_id: &str) -> AppResult<Dataset> {
    let load = store.load_snapshots(job_id)?;
    if let Some(corruption) = &load.corruption {
        eprintln!(
            "Warning: snapshot frame {} is corrupted, using the {} valid frames before it",
            corruption.line,
            load.records.len()
        );
    }
    if load.records.is_empty() {
        return Err(lf_app::AppError::NoData(job_id.to_string()));
    }
    Ok(Dataset::from_records(job_id, &load.records)?)
}

fn cmd_show(root: PathBuf, job_id: &str) -> AppResult<()> {
    let store = SnapshotStore::new(root)?;
    let config = store.load_config(job_id)?;
    let dataset = load_dataset(&store, job_id)?;
    let summary = dataset_summary(&dataset)?;

    println!("Job {}", job_id);
    println!("  cells = {}, dt = {:.3} s, t_end = {:.3} s", config.cells, config.dt_s, config.t_end_s);
    println!("  Snapshots:  {}", summary.snapshot_count);
    println!(
        "  Time range: {:.3} - {:.3} s",
        summary.time_range.0, summary.time_range.1
    );
    println!("  Fields:");
    for name in &summary.field_names {
        println!("    {}", name);
    }
    if !dataset.derived.is_empty() {
        println!("  Derived scalars:");
        for name in dataset.derived.keys() {
            println!("    {}", name);
        }
    }
    Ok(())
}

fn cmd_export(
    root: PathBuf,
    job_id: &str,
    field: &str,
    cell: usize,
    output: Option<&std::path::Path>,
) -> AppResult<()> {
    let store = SnapshotStore::new(root)?;
    let dataset = load_dataset(&store, job_id)?;

    let series = if let Ok(data) = extract_cell_series(&dataset, field, cell) {
        data
    } else {
        // Fall back to a derived scalar of that name
        extract_derived_series(&dataset, field)?
    };

    let mut csv = String::from("time_s,value\n");
    for (t, value) in &series {
        csv.push_str(&format!("{},{}\n", t, value));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }
    Ok(())
}

fn cmd_size(root: PathBuf, job_id: &str) -> AppResult<()> {
    let store = SnapshotStore::new(root)?;
    println!("{} bytes", store.storage_size(job_id)?);
    Ok(())
}

fn cmd_delete(root: PathBuf, job_id: &str) -> AppResult<()> {
    let store = SnapshotStore::new(root)?;
    store.delete_job(job_id)?;
    println!("✓ Deleted {}", job_id);
    Ok(())
}
