use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::StoreAppConfig;
use crate::cli::StoreArgs;
use crate::error::{CliError, Result};
use amsdb::core::extract::space_group::SpaceGroupParser;
use amsdb::engine::config::StoreRequestBuilder;
use std::path::Path;

pub fn build_store_config(args: &StoreArgs, config_path: Option<&Path>) -> Result<StoreAppConfig> {
    let defaults = DefaultsConfig::default();

    let mut file_config = match config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let store_file = file_config.store.take().unwrap_or_default();
    let naming_file = file_config.naming.take().unwrap_or_default();

    let subset_name = args.subset_name.clone().or(store_file.subset_name);
    let task = args.task.clone().or(store_file.task);
    let user = args.user.clone().or(store_file.user);

    let add_initial_configuration = args.add_initial_configuration
        || store_file
            .add_initial_configuration
            .unwrap_or(defaults.add_initial_configuration);
    let use_runtime = !args.no_runtime && store_file.use_runtime.unwrap_or(defaults.use_runtime);
    let report = !args.quiet_report && store_file.report.unwrap_or(defaults.report);

    let (full_dataset, training_set) = match (&args.full_dataset, &args.training_set) {
        (Some(full), Some(training)) => (Some(full.clone()), Some(training.clone())),
        _ => (store_file.full_dataset, store_file.training_set),
    };

    let mut builder = StoreRequestBuilder::new()
        .user(user)
        .add_initial_configuration(add_initial_configuration)
        .use_runtime(use_runtime)
        .full_dataset(full_dataset)
        .training_set(training_set);
    if let Some(subset_name) = subset_name {
        builder = builder.subset_name(subset_name);
    }
    if let Some(task) = task {
        builder = builder.task(task);
    }
    let request = builder.build().map_err(|e| {
        CliError::Config(format!(
            "{}. Set it with a command-line flag or in the [store] section of the config file.",
            e
        ))
    })?;

    let compound = naming_file.compound.unwrap_or(defaults.compound);
    let fragments = naming_file.fragments.unwrap_or(defaults.fragments);
    let parser = SpaceGroupParser::new(&compound, [fragments[0].as_str(), fragments[1].as_str()]);

    Ok(StoreAppConfig {
        request,
        parser,
        report,
    })
}
