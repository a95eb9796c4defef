use amsdb::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Turns store events into a progress bar and the per-row report.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    report: bool,
}

impl CliProgressHandler {
    /// `show_bar` draws the bar on stderr; `report` prints the row table of every written row.
    pub fn new(show_bar: bool, report: bool) -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::bar_style())
            .with_message("Storing jobs");
        if show_bar {
            pb.set_draw_target(ProgressDrawTarget::stderr());
        } else {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
            report,
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();
        let report = self.report;

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::BatchStart { jobs } => {
                    pb_guard.reset();
                    pb_guard.set_length(jobs);
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                }
                Progress::JobStart { path } => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    pb_guard.set_message(name);
                }
                Progress::RowWritten {
                    id,
                    task,
                    source,
                    summary,
                } => {
                    pb_guard.set_message(format!("row {} ({})", id, task));
                    if report {
                        let text = format!(
                            "Added `{}` of simulation: {}\n{}",
                            task,
                            source.display(),
                            summary
                        );
                        if pb_guard.is_hidden() {
                            println!("{}", text);
                        } else {
                            pb_guard.println(text);
                        }
                    }
                }
                Progress::JobFinish => {
                    pb_guard.inc(1);
                }
                Progress::BatchFinish => {
                    pb_guard.finish_with_message("✓ Done");
                }
                Progress::Message(msg) => {
                    if pb_guard.is_hidden() {
                        println!("  {}", msg);
                    } else {
                        pb_guard.println(format!("  {}", msg));
                    }
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<30} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("Failed to create bar style template")
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}
