use crate::core::extract::dataset::{DatasetUsage, dataset_usage};
use crate::core::extract::electronic::{band_info, density_of_states};
use crate::core::extract::history::history;
use crate::core::extract::naming::{calculator_label, display_name, functional};
use crate::core::extract::runtime::{Runtime, now_in_years, runtime, years_since_2000};
use crate::core::extract::space_group::SpaceGroupParser;
use crate::core::extract::{ExtractionError, absent_section};
use crate::core::job::snapshot::JobSnapshot;
use crate::core::job::{JobError, JobResult};
use crate::db::report::row_info;
use crate::db::row::AtomsRow;
use crate::db::{AtomsDatabase, DbError};
use crate::engine::calculator::Calculator;
use crate::engine::config::{ConfigError, StoreRequest};
use crate::engine::error::CalculatorError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::strategy::ExecutionMode;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Task recorded for the row holding a job's input structure.
pub const INITIAL_CONFIGURATION_TASK: &str = "initial configuration";

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Calculator error: {0}")]
    Calculator(#[from] CalculatorError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No author given and the USER environment variable is not set")]
    MissingAuthor,
}

/// Ids of the rows written for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOutcome {
    pub initial_configuration: Option<i64>,
    pub simulation: i64,
}

fn resolve_author(explicit: Option<&str>, env: Option<String>) -> Option<String> {
    explicit
        .map(str::to_string)
        .or(env)
        .filter(|user| !user.trim().is_empty())
}

fn optional_text(value: Result<String, JobError>) -> Result<Option<String>, JobError> {
    match value {
        Ok(text) => Ok(Some(text)),
        Err(e) if absent_section(&e) => Ok(None),
        Err(e) => Err(e),
    }
}

fn creation_time(runtime: &Runtime, use_runtime: bool) -> f64 {
    match runtime.started_at() {
        Some(t) if use_runtime => years_since_2000(t),
        _ => now_in_years(),
    }
}

struct PreparedRows {
    initial_configuration: Option<AtomsRow>,
    simulation: AtomsRow,
}

fn prepare_rows(
    job: &dyn JobResult,
    request: &StoreRequest,
    parser: &SpaceGroupParser,
    user: &str,
) -> Result<PreparedRows, WorkflowError> {
    let sim_name = job.name().to_string();
    let name = display_name(&sim_name);
    let space_group = parser.parse(&sim_name);
    let runtime = runtime(job);
    let ctime = creation_time(&runtime, request.use_runtime);
    let used_in = match &request.manifests {
        Some(m) => dataset_usage(&sim_name, &m.full_dataset, &m.training_set)?,
        None => DatasetUsage::None,
    };
    let engines = job.engine_names();
    debug!(
        "Job '{}': space group {:?}, runtime '{}', used in '{}'",
        sim_name, space_group, runtime, used_in
    );

    let initial_configuration = if request.add_initial_configuration {
        let mut row = AtomsRow::new(job.input_atoms()?, user, ctime);
        row.set("sim_name", sim_name.as_str());
        row.set("name", name.as_str());
        row.set_optional("space_group", space_group.as_deref());
        row.set("subset_name", request.subset_name.as_str());
        row.set("runtime", runtime.to_string());
        row.set("used_in", DatasetUsage::None.as_str());
        row.set("task", INITIAL_CONFIGURATION_TASK);
        Some(row)
    } else {
        None
    };

    let atoms = job.atoms()?;
    let settings = job.settings();
    let mut row = AtomsRow::new(atoms.clone(), user, ctime);
    if job.ok() {
        let mut calculator = Calculator::new(
            settings.clone(),
            sim_name.as_str(),
            ExecutionMode::Job,
            false,
            Some(atoms),
        );
        calculator.results_from(job, settings)?;
        row = row.with_results(calculator.results());
    } else {
        warn!("Job '{}' did not finish successfully, storing it without results", sim_name);
    }

    let band = band_info(job)?;
    let dos = density_of_states(job)?;
    let history = history(job)?;
    let elapsed = job.timings()?.get("elapsed").copied();

    row.set_optional("input_script", optional_text(job.input())?);
    row.set_optional("run_script", optional_text(job.runscript())?);
    row.set("sim_name", sim_name.as_str());
    row.set("name", name.as_str());
    row.set("success", job.ok());
    row.set_optional("space_group", space_group);
    row.set("subset_name", request.subset_name.as_str());
    row.set_optional(
        "functional",
        engines.first().and_then(|engine| functional(settings, engine)),
    );
    row.set("runtime", runtime.to_string());
    if let Some(band) = band {
        row.set("fermi_energy", band.fermi_energy);
        row.set("homo_energy", band.homo_energy);
        row.set("lumo_energy", band.lumo_energy);
        row.set("band_gap", band.band_gap);
    }
    row.set("used_in", used_in.as_str());
    row.set("task", request.task.as_str());
    row.set_optional("elapsed", elapsed);
    if let Some(dos) = dos {
        row.data.insert("DOS".to_string(), dos.to_data());
    }
    row.data.insert("History".to_string(), history.to_data());
    row.calculator = Some(calculator_label(&engines));
    row.calculator_parameters = Some(settings.to_value());

    Ok(PreparedRows {
        initial_configuration,
        simulation: row,
    })
}

/// Stores one job: optionally its input structure, then its final structure
/// with results and extracted attributes.
///
/// Both rows are assembled before the first write, so an extraction failure
/// leaves the database untouched.
#[instrument(skip_all, fields(job = %job.name()))]
pub fn store_job(
    db: &mut dyn AtomsDatabase,
    job: &dyn JobResult,
    request: &StoreRequest,
    parser: &SpaceGroupParser,
) -> Result<StoreOutcome, WorkflowError> {
    let user = resolve_author(request.user.as_deref(), std::env::var("USER").ok())
        .ok_or(WorkflowError::MissingAuthor)?;
    let rows = prepare_rows(job, request, parser, &user)?;

    let initial_configuration = match rows.initial_configuration {
        Some(row) => {
            let id = db.write(row)?;
            info!("Stored input structure of '{}' as row {}", job.name(), id);
            Some(id)
        }
        None => None,
    };
    let simulation = db.write(rows.simulation)?;
    info!(
        "Stored `{}` of '{}' as row {}",
        request.task,
        job.name(),
        simulation
    );

    Ok(StoreOutcome {
        initial_configuration,
        simulation,
    })
}

/// Loads and stores a list of job snapshots in order, stopping at the first failure.
#[instrument(skip_all, name = "store_workflow")]
pub fn store_jobs(
    db: &mut dyn AtomsDatabase,
    paths: &[PathBuf],
    request: &StoreRequest,
    parser: &SpaceGroupParser,
    reporter: &ProgressReporter,
) -> Result<Vec<StoreOutcome>, WorkflowError> {
    reporter.report(Progress::BatchStart {
        jobs: paths.len() as u64,
    });
    let mut outcomes = Vec::with_capacity(paths.len());
    for path in paths {
        reporter.report(Progress::JobStart { path: path.clone() });
        let job = JobSnapshot::load(path)?;
        let outcome = store_job(db, &job, request, parser)?;
        if !job.ok() {
            reporter.report(Progress::Message(format!(
                "{} did not finish successfully, stored without results",
                job.name()
            )));
        }
        let written = outcome
            .initial_configuration
            .map(|id| (id, INITIAL_CONFIGURATION_TASK))
            .into_iter()
            .chain(std::iter::once((outcome.simulation, request.task.as_str())));
        for (id, task) in written {
            reporter.report(Progress::RowWritten {
                id,
                task: task.to_string(),
                source: path.clone(),
                summary: row_info(&db.get(id)?),
            });
        }
        reporter.report(Progress::JobFinish);
        outcomes.push(outcome);
    }
    reporter.report(Progress::BatchFinish);
    Ok(outcomes)
}
