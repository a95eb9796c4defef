use std::path::PathBuf;

/// Events emitted while a batch of jobs is stored.
#[derive(Debug, Clone)]
pub enum Progress {
    BatchStart { jobs: u64 },
    JobStart { path: PathBuf },
    /// A row was written; `summary` is its [`row_info`](crate::db::report::row_info) table.
    RowWritten {
        id: i64,
        task: String,
        source: PathBuf,
        summary: String,
    },
    JobFinish,
    BatchFinish,

    /// A note about the current job, such as one stored without results.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
