use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Dataset manifests used to tell training jobs from test jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifests {
    pub full_dataset: PathBuf,
    pub training_set: PathBuf,
}

/// What to store for one job and how to label it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRequest {
    pub subset_name: String,
    pub task: String,
    /// Author of the rows. Falls back to the `USER` environment variable.
    pub user: Option<String>,
    pub add_initial_configuration: bool,
    /// Use the job start time as creation time instead of the current time.
    pub use_runtime: bool,
    pub manifests: Option<Manifests>,
}

#[derive(Default)]
pub struct StoreRequestBuilder {
    subset_name: Option<String>,
    task: Option<String>,
    user: Option<String>,
    add_initial_configuration: Option<bool>,
    use_runtime: Option<bool>,
    full_dataset: Option<PathBuf>,
    training_set: Option<PathBuf>,
}

impl StoreRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subset_name(mut self, name: impl Into<String>) -> Self {
        self.subset_name = Some(name.into());
        self
    }
    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }
    pub fn user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }
    pub fn add_initial_configuration(mut self, enabled: bool) -> Self {
        self.add_initial_configuration = Some(enabled);
        self
    }
    pub fn use_runtime(mut self, enabled: bool) -> Self {
        self.use_runtime = Some(enabled);
        self
    }
    pub fn full_dataset(mut self, path: Option<PathBuf>) -> Self {
        self.full_dataset = path;
        self
    }
    pub fn training_set(mut self, path: Option<PathBuf>) -> Self {
        self.training_set = path;
        self
    }

    pub fn build(self) -> Result<StoreRequest, ConfigError> {
        let manifests = match (self.full_dataset, self.training_set) {
            (Some(full_dataset), Some(training_set)) => Some(Manifests {
                full_dataset,
                training_set,
            }),
            (None, None) => None,
            _ => {
                warn!("Only one dataset manifest given, dataset usage will be 'none'");
                None
            }
        };
        Ok(StoreRequest {
            subset_name: self
                .subset_name
                .ok_or(ConfigError::MissingParameter("subset_name"))?,
            task: self.task.ok_or(ConfigError::MissingParameter("task"))?,
            user: self.user,
            add_initial_configuration: self.add_initial_configuration.unwrap_or(false),
            use_runtime: self.use_runtime.unwrap_or(true),
            manifests,
        })
    }
}
