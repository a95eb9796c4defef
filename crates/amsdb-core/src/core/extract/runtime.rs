use crate::core::job::JobResult;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const LOG_FILE_NAME: &str = "ams.log";

/// Length of a year in seconds (365.25 days).
pub const YEAR_SECONDS: f64 = 31_557_600.0;

static LOG_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-z][a-z]\d\d-\d\d\d\d \d\d:\d\d:\d\d").expect("valid timestamp pattern")
});

const LOG_TIMESTAMP_FORMAT: &str = "%b%d-%Y %H:%M:%S";
const DISPLAY_FORMAT: &str = "%a %d %b %Y, %H:%M:%S";

/// Start time of a job, read from the first line of its log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    Started(NaiveDateTime),
    NotStarted,
}

impl Runtime {
    pub fn started_at(&self) -> Option<NaiveDateTime> {
        match self {
            Runtime::Started(t) => Some(*t),
            Runtime::NotStarted => None,
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Runtime::Started(t) => write!(f, "{}", t.format(DISPLAY_FORMAT)),
            Runtime::NotStarted => write!(f, "Not Started"),
        }
    }
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("2000-01-01 is a valid date")
}

/// Years elapsed between 2000-01-01T00:00:00 and `t`.
pub fn years_since_2000(t: NaiveDateTime) -> f64 {
    (t - epoch()).num_milliseconds() as f64 / 1000.0 / YEAR_SECONDS
}

/// Current wall-clock time on the [`years_since_2000`] scale.
pub fn now_in_years() -> f64 {
    years_since_2000(Utc::now().naive_utc())
}

pub fn parse_log_line(line: &str) -> Option<NaiveDateTime> {
    let found = LOG_TIMESTAMP.find(line)?;
    NaiveDateTime::parse_from_str(found.as_str(), LOG_TIMESTAMP_FORMAT).ok()
}

pub fn runtime_from_log(log_path: &Path) -> Runtime {
    let file = match File::open(log_path) {
        Ok(file) => file,
        Err(e) => {
            debug!("No readable job log at {:?} ({}), job not started", log_path, e);
            return Runtime::NotStarted;
        }
    };
    let first_line = BufReader::new(file).lines().next();
    match first_line {
        Some(Ok(line)) => match parse_log_line(&line) {
            Some(t) => Runtime::Started(t),
            None => {
                warn!("No start timestamp in first line of {:?}", log_path);
                Runtime::NotStarted
            }
        },
        _ => Runtime::NotStarted,
    }
}

pub fn runtime(job: &dyn JobResult) -> Runtime {
    runtime_from_log(&job.path().join(LOG_FILE_NAME))
}
