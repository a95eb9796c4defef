//! # Engine Module
//!
//! Stateful adapter between the library and the external simulation engine.
//!
//! ## Overview
//!
//! A [`calculator::Calculator`] hands a structure to the engine through a
//! caller-supplied [`strategy::EngineSession`], caches what came back and turns
//! raw job results into laboratory-unit properties with a set of
//! [`extractors::PropertyExtractor`]s. The same extractors attach results to
//! stored structures, which is how the store workflow uses this layer.
//!
//! - **Calculator** ([`calculator`]) - Result cache, property requests and engine calls
//! - **Execution** ([`strategy`]) - Worker and job execution modes
//! - **Extractors** ([`extractors`]) - Energy, forces, stress and charges
//! - **Run naming** ([`counter`]) - Caller-owned run directory counters
//! - **Configuration** ([`config`]) - Store requests and their builder
//! - **Progress** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Calculator error types

pub mod calculator;
pub mod config;
pub mod counter;
pub mod error;
pub mod extractors;
pub mod progress;
pub mod strategy;

#[cfg(test)]
pub(crate) mod test_support {
    use super::error::CalculatorError;
    use super::strategy::EngineSession;
    use crate::core::job::JobResult;
    use crate::core::job::snapshot::JobSnapshot;
    use crate::core::models::atoms::Atoms;
    use crate::core::settings::Settings;
    use nalgebra::Point3;
    use serde_json::{Value, json};
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Start {
            restart: bool,
        },
        Solve {
            name: String,
            settings: Value,
            had_previous: bool,
        },
        Job {
            name: String,
            settings: Value,
        },
        Stop,
    }

    /// Records every engine call and answers with a fixed single-point result.
    pub struct FakeSession {
        calls: Rc<RefCell<Vec<Call>>>,
        ok: Rc<Cell<bool>>,
    }

    impl FakeSession {
        pub fn new() -> (Self, Rc<RefCell<Vec<Call>>>) {
            Self::with_status(Rc::new(Cell::new(true)))
        }

        pub fn with_status(ok: Rc<Cell<bool>>) -> (Self, Rc<RefCell<Vec<Call>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    ok,
                },
                calls,
            )
        }

        fn result(&self, run_name: &str, atoms: &Atoms) -> Box<dyn JobResult> {
            Box::new(JobSnapshot {
                name: run_name.to_string(),
                path: PathBuf::from("runs").join(run_name),
                ok: self.ok.get(),
                engines: vec!["band".to_string()],
                settings: Settings::new(),
                input_atoms: Some(atoms.clone()),
                atoms: Some(atoms.clone()),
                energy: Some(-1.0),
                gradients: Some(vec![[0.0, 0.0, 0.01]; atoms.len()]),
                stress_tensor: None,
                charges: Some(vec![0.0; atoms.len()]),
                sections: Default::default(),
                timings: Default::default(),
                input: None,
                runscript: None,
            })
        }
    }

    impl EngineSession for FakeSession {
        fn start_worker(
            &mut self,
            _settings: &Settings,
            use_restart_cache: bool,
        ) -> Result<(), CalculatorError> {
            self.calls.borrow_mut().push(Call::Start {
                restart: use_restart_cache,
            });
            Ok(())
        }

        fn solve(
            &mut self,
            run_name: &str,
            atoms: &Atoms,
            settings: &Settings,
            previous: Option<&dyn JobResult>,
        ) -> Result<Box<dyn JobResult>, CalculatorError> {
            self.calls.borrow_mut().push(Call::Solve {
                name: run_name.to_string(),
                settings: settings.to_value(),
                had_previous: previous.is_some(),
            });
            Ok(self.result(run_name, atoms))
        }

        fn run_job(
            &mut self,
            run_name: &str,
            atoms: &Atoms,
            settings: &Settings,
        ) -> Result<Box<dyn JobResult>, CalculatorError> {
            self.calls.borrow_mut().push(Call::Job {
                name: run_name.to_string(),
                settings: settings.to_value(),
            });
            Ok(self.result(run_name, atoms))
        }

        fn stop_worker(&mut self) -> Result<(), CalculatorError> {
            self.calls.borrow_mut().push(Call::Stop);
            Ok(())
        }
    }

    pub fn lif() -> Atoms {
        Atoms::new(
            vec!["Li".into(), "F".into()],
            vec![Point3::origin(), Point3::new(1.6, 0.0, 0.0)],
        )
        .unwrap()
    }

    pub fn settings_with_task() -> Settings {
        Settings::from_value(json!({
            "input": {
                "ams": {"Task": "SinglePoint", "Properties": {"Gradients": "Yes"}},
                "band": {"XC": {"GGA": "PBE"}}
            }
        }))
        .unwrap()
    }
}
