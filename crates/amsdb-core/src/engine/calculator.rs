use super::counter::RunCounter;
use super::error::CalculatorError;
use super::extractors::{PropertyExtractor, PropertyValue, default_extractors};
use super::strategy::{EngineSession, ExecutionMode, ExecutionStrategy};
use crate::core::job::JobResult;
use crate::core::models::atoms::Atoms;
use crate::core::settings::Settings;
use nalgebra::Vector3;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Kinds of change to a structure since the previous calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemChange {
    Positions,
    Numbers,
    Cell,
    Pbc,
    InitialCharges,
    InitialMagmoms,
}

pub const ALL_CHANGES: &[SystemChange] = &[
    SystemChange::Positions,
    SystemChange::Numbers,
    SystemChange::Cell,
    SystemChange::Pbc,
    SystemChange::InitialCharges,
    SystemChange::InitialMagmoms,
];

/// Properties computed by the last successful calculation, keyed by extractor name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculatorResults {
    values: BTreeMap<String, PropertyValue>,
}

impl CalculatorResults {
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn energy(&self) -> Option<f64> {
        match self.values.get("energy") {
            Some(PropertyValue::Scalar(e)) => Some(*e),
            _ => None,
        }
    }

    pub fn forces(&self) -> Option<&[Vector3<f64>]> {
        match self.values.get("forces") {
            Some(PropertyValue::Vectors(f)) => Some(f),
            _ => None,
        }
    }

    pub fn stress(&self) -> Option<[f64; 6]> {
        match self.values.get("stress") {
            Some(PropertyValue::Voigt(s)) => Some(*s),
            _ => None,
        }
    }

    pub fn charges(&self) -> Option<&[f64]> {
        match self.values.get("charges") {
            Some(PropertyValue::PerAtom(q)) => Some(q),
            _ => None,
        }
    }

    fn insert(&mut self, name: &str, value: PropertyValue) {
        self.values.insert(name.to_string(), value);
    }

    fn clear(&mut self) {
        self.values.clear();
    }
}

/// Adapter that runs an external engine on a structure and caches its results.
///
/// The execution mode is fixed at construction. A worker session is started on
/// the first calculation and kept until [`Calculator::stop_worker`] or drop; a
/// job session runs every calculation as a separate job in `<name><n>`, where
/// `n` is drawn from the caller's [`RunCounter`].
pub struct Calculator {
    settings: Settings,
    name: String,
    restart: bool,
    atoms: Option<Atoms>,
    extractors: Vec<Box<dyn PropertyExtractor>>,
    strategy: ExecutionStrategy,
    session: Option<Box<dyn EngineSession>>,
    previous: Option<Box<dyn JobResult>>,
    results: CalculatorResults,
    properties_updated: bool,
}

impl Calculator {
    pub fn new(
        settings: Settings,
        name: impl Into<String>,
        mode: ExecutionMode,
        restart: bool,
        atoms: Option<Atoms>,
    ) -> Self {
        let strategy = ExecutionStrategy::new(mode, &settings, restart);
        Self {
            settings,
            name: name.into(),
            restart,
            atoms,
            extractors: default_extractors(),
            strategy,
            session: None,
            previous: None,
            results: CalculatorResults::default(),
            properties_updated: false,
        }
    }

    pub fn with_session(mut self, session: Box<dyn EngineSession>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn PropertyExtractor>) -> Self {
        self.register_extractor(extractor);
        self
    }

    /// Adds an extractor. Returns `false` when one with the same name is already registered.
    pub fn register_extractor(&mut self, extractor: Box<dyn PropertyExtractor>) -> bool {
        if self.extractors.iter().any(|e| e.name() == extractor.name()) {
            debug!("Extractor '{}' already registered", extractor.name());
            return false;
        }
        self.extractors.push(extractor);
        true
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn restart(&self) -> bool {
        self.restart
    }

    pub fn mode(&self) -> ExecutionMode {
        self.strategy.mode()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn atoms(&self) -> Option<&Atoms> {
        self.atoms.as_ref()
    }

    pub fn results(&self) -> &CalculatorResults {
        &self.results
    }

    pub fn implemented_properties(&self) -> Vec<String> {
        self.extractors
            .iter()
            .filter(|e| e.is_enabled(&self.settings))
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Computes `properties` for `atoms`, or for the last known structure when
    /// `atoms` is `None`.
    ///
    /// Nothing is run when the structure is unchanged, every requested property
    /// is cached and no property was enabled since the previous call. An engine
    /// run that does not finish successfully clears all cached results.
    #[instrument(skip_all, fields(name = %self.name))]
    pub fn calculate(
        &mut self,
        atoms: Option<&Atoms>,
        properties: &[&str],
        system_changes: &[SystemChange],
        counter: &mut RunCounter,
    ) -> Result<(), CalculatorError> {
        if let Some(atoms) = atoms {
            if self.atoms.as_ref() == Some(atoms)
                && system_changes.is_empty()
                && properties.iter().all(|p| self.results.contains(p))
                && !self.properties_updated
            {
                debug!("Results are up to date, skipping engine call");
                return Ok(());
            }
            self.atoms = Some(atoms.clone());
        }
        self.properties_updated = false;
        let atoms = self.atoms.clone().ok_or(CalculatorError::NoAtoms)?;
        let session = self
            .session
            .as_deref_mut()
            .ok_or_else(|| CalculatorError::Session("no engine session attached".into()))?;

        let run_name = counter.next_run_name(&self.name);
        let job_settings = self.settings.clone();
        let result = self.strategy.run(
            session,
            &run_name,
            &atoms,
            &job_settings,
            self.previous.as_deref(),
        )?;
        if !result.ok() {
            warn!("Engine run '{}' did not finish successfully", run_name);
            self.results.clear();
            return Ok(());
        }

        self.results_from(result.as_ref(), &job_settings)?;
        self.previous = Some(result);
        Ok(())
    }

    /// Switches on the engine flags the given properties need.
    pub fn ensure_property(&mut self, properties: &[&str]) -> Result<(), CalculatorError> {
        for property in properties {
            let extractor = self
                .extractors
                .iter()
                .find(|e| e.name() == *property)
                .ok_or_else(|| CalculatorError::NotImplemented(property.to_string()))?;
            extractor.enable(&mut self.settings);
            self.properties_updated = true;
        }
        Ok(())
    }

    /// Fills the results from an existing job, running every extractor that is
    /// enabled for `settings`.
    pub fn results_from(
        &mut self,
        result: &dyn JobResult,
        settings: &Settings,
    ) -> Result<(), CalculatorError> {
        let atoms = self.atoms.as_ref().ok_or(CalculatorError::NoAtoms)?;
        for extractor in self.extractors.iter().filter(|e| e.is_enabled(settings)) {
            let value = extractor.extract(result, atoms)?;
            self.results.insert(extractor.name(), value);
        }
        Ok(())
    }

    pub fn stop_worker(&mut self) -> Result<(), CalculatorError> {
        match self.session.as_deref_mut() {
            Some(session) => self.strategy.stop(session),
            None => Ok(()),
        }
    }
}

impl Drop for Calculator {
    fn drop(&mut self) {
        if let Err(e) = self.stop_worker() {
            warn!("Failed to stop engine worker: {}", e);
        }
    }
}
