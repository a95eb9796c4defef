use super::error::CalculatorError;
use crate::core::job::JobResult;
use crate::core::models::atoms::Atoms;
use crate::core::settings::Settings;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// The external simulation engine.
///
/// A worker is a long-lived interactive process fed one system at a time; a job
/// is a self-contained run that leaves its files on disk. Implementations only
/// need to support the calls of the execution mode they are used with.
pub trait EngineSession {
    fn start_worker(
        &mut self,
        settings: &Settings,
        use_restart_cache: bool,
    ) -> Result<(), CalculatorError>;

    /// Solves one system on the running worker.
    fn solve(
        &mut self,
        run_name: &str,
        atoms: &Atoms,
        settings: &Settings,
        previous: Option<&dyn JobResult>,
    ) -> Result<Box<dyn JobResult>, CalculatorError>;

    /// Runs one job in a fresh run directory.
    fn run_job(
        &mut self,
        run_name: &str,
        atoms: &Atoms,
        settings: &Settings,
    ) -> Result<Box<dyn JobResult>, CalculatorError>;

    fn stop_worker(&mut self) -> Result<(), CalculatorError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    Worker,
    #[default]
    Job,
}

pub struct WorkerStrategy {
    worker_settings: Settings,
    restart: bool,
    running: bool,
}

impl WorkerStrategy {
    /// The worker is started without the driver task and property requests;
    /// those are sent with every system instead.
    pub fn new(settings: &Settings, restart: bool) -> Self {
        let mut worker_settings = settings.clone();
        worker_settings.remove(&["input", "ams", "Task"]);
        worker_settings.remove(&["input", "ams", "Properties"]);
        Self {
            worker_settings,
            restart,
            running: false,
        }
    }

    pub fn worker_settings(&self) -> &Settings {
        &self.worker_settings
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn run(
        &mut self,
        session: &mut dyn EngineSession,
        run_name: &str,
        atoms: &Atoms,
        job_settings: &Settings,
        previous: Option<&dyn JobResult>,
    ) -> Result<Box<dyn JobResult>, CalculatorError> {
        if !self.running {
            info!("Starting engine worker");
            session.start_worker(&self.worker_settings, self.restart)?;
            self.running = true;
        }
        let mut request = Settings::new();
        let driver = job_settings
            .get(&["input", "ams"])
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        request.set(&["input", "ams"], driver);
        if let Some(worker) = job_settings.get(&["amsworker"]) {
            request.set(&["amsworker"], worker.clone());
        }
        debug!("Solving '{}' on the running worker", run_name);
        session.solve(run_name, atoms, &request, previous)
    }

    fn stop(&mut self, session: &mut dyn EngineSession) -> Result<(), CalculatorError> {
        if self.running {
            info!("Stopping engine worker");
            self.running = false;
            session.stop_worker()?;
        }
        Ok(())
    }
}

pub struct JobStrategy {
    restart: bool,
}

impl JobStrategy {
    pub fn new(restart: bool) -> Self {
        Self { restart }
    }

    fn run(
        &self,
        session: &mut dyn EngineSession,
        run_name: &str,
        atoms: &Atoms,
        job_settings: &Settings,
        previous: Option<&dyn JobResult>,
    ) -> Result<Box<dyn JobResult>, CalculatorError> {
        let mut settings = job_settings.clone();
        if self.restart {
            if let Some(engine_file) = previous.and_then(|p| p.engine_file()) {
                debug!("Restarting '{}' from {:?}", run_name, engine_file);
                settings.set(
                    &["input", "ams", "EngineRestart"],
                    Value::from(engine_file.display().to_string()),
                );
            }
        }
        debug!("Running job '{}'", run_name);
        session.run_job(run_name, atoms, &settings)
    }
}

/// How a calculator talks to the engine, fixed at construction.
pub enum ExecutionStrategy {
    Worker(WorkerStrategy),
    Job(JobStrategy),
}

impl ExecutionStrategy {
    pub fn new(mode: ExecutionMode, settings: &Settings, restart: bool) -> Self {
        match mode {
            ExecutionMode::Worker => {
                ExecutionStrategy::Worker(WorkerStrategy::new(settings, restart))
            }
            ExecutionMode::Job => ExecutionStrategy::Job(JobStrategy::new(restart)),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self {
            ExecutionStrategy::Worker(_) => ExecutionMode::Worker,
            ExecutionStrategy::Job(_) => ExecutionMode::Job,
        }
    }

    pub(crate) fn run(
        &mut self,
        session: &mut dyn EngineSession,
        run_name: &str,
        atoms: &Atoms,
        job_settings: &Settings,
        previous: Option<&dyn JobResult>,
    ) -> Result<Box<dyn JobResult>, CalculatorError> {
        match self {
            ExecutionStrategy::Worker(worker) => {
                worker.run(session, run_name, atoms, job_settings, previous)
            }
            ExecutionStrategy::Job(job) => {
                job.run(session, run_name, atoms, job_settings, previous)
            }
        }
    }

    pub(crate) fn stop(&mut self, session: &mut dyn EngineSession) -> Result<(), CalculatorError> {
        match self {
            ExecutionStrategy::Worker(worker) => worker.stop(session),
            ExecutionStrategy::Job(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{Call, FakeSession, lif, settings_with_task};
    use serde_json::json;

    #[test]
    fn worker_settings_drop_task_and_properties() {
        let worker = WorkerStrategy::new(&settings_with_task(), true);
        assert!(!worker.worker_settings().contains(&["input", "ams", "Task"]));
        assert!(!worker.worker_settings().contains(&["input", "ams", "Properties"]));
        assert!(worker.worker_settings().contains(&["input", "band"]));
    }

    #[test]
    fn worker_starts_once_and_sends_driver_settings_only() {
        let (mut session, calls) = FakeSession::new();
        let settings = settings_with_task();
        let mut strategy = ExecutionStrategy::new(ExecutionMode::Worker, &settings, true);
        strategy
            .run(&mut session, "calc1", &lif(), &settings, None)
            .unwrap();
        strategy
            .run(&mut session, "calc2", &lif(), &settings, None)
            .unwrap();
        strategy.stop(&mut session).unwrap();
        strategy.stop(&mut session).unwrap();

        let calls = calls.borrow();
        assert_eq!(
            *calls,
            vec![
                Call::Start { restart: true },
                Call::Solve {
                    name: "calc1".into(),
                    settings: json!({"input": {"ams": {"Task": "SinglePoint", "Properties": {"Gradients": "Yes"}}}}),
                    had_previous: false,
                },
                Call::Solve {
                    name: "calc2".into(),
                    settings: json!({"input": {"ams": {"Task": "SinglePoint", "Properties": {"Gradients": "Yes"}}}}),
                    had_previous: false,
                },
                Call::Stop,
            ]
        );
    }

    #[test]
    fn job_restart_points_at_previous_engine_file() {
        let (mut session, calls) = FakeSession::new();
        let settings = settings_with_task();
        let mut strategy = ExecutionStrategy::new(ExecutionMode::Job, &settings, true);
        let first = strategy
            .run(&mut session, "calc1", &lif(), &settings, None)
            .unwrap();
        strategy
            .run(&mut session, "calc2", &lif(), &settings, Some(first.as_ref()))
            .unwrap();

        let calls = calls.borrow();
        let Call::Job { settings: second, .. } = &calls[1] else {
            panic!("expected a job call");
        };
        assert_eq!(
            second["input"]["ams"]["EngineRestart"],
            json!("runs/calc1/band.rkf")
        );
        let Call::Job { settings: first, .. } = &calls[0] else {
            panic!("expected a job call");
        };
        assert!(first["input"]["ams"].get("EngineRestart").is_none());
    }

    #[test]
    fn job_without_restart_ignores_previous_result() {
        let (mut session, calls) = FakeSession::new();
        let settings = settings_with_task();
        let mut strategy = ExecutionStrategy::new(ExecutionMode::Job, &settings, false);
        let first = strategy
            .run(&mut session, "calc1", &lif(), &settings, None)
            .unwrap();
        strategy
            .run(&mut session, "calc2", &lif(), &settings, Some(first.as_ref()))
            .unwrap();
        let Call::Job { settings, .. } = &calls.borrow()[1] else {
            panic!("expected a job call");
        };
        assert!(settings["input"]["ams"].get("EngineRestart").is_none());
        assert_eq!(strategy.mode(), ExecutionMode::Job);
    }
}
