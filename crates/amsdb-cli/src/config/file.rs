use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileStoreConfig {
    pub subset_name: Option<String>,
    pub task: Option<String>,
    pub user: Option<String>,
    pub add_initial_configuration: Option<bool>,
    pub use_runtime: Option<bool>,
    pub full_dataset: Option<PathBuf>,
    pub training_set: Option<PathBuf>,
    pub report: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileNamingConfig {
    pub compound: Option<String>,
    pub fragments: Option<[String; 2]>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub store: Option<FileStoreConfig>,
    pub naming: Option<FileNamingConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
