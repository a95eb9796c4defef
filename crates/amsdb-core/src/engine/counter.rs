use std::collections::HashMap;

/// Per-name run counters used to build unique run directory names.
///
/// Owned by the caller and shared between calculators that should not reuse
/// each other's directories.
#[derive(Debug, Clone, Default)]
pub struct RunCounter {
    counts: HashMap<String, u64>,
}

impl RunCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter of `name` and returns the new value, starting at 1.
    pub fn next(&mut self, name: &str) -> u64 {
        let count = self.counts.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn set(&mut self, name: &str, value: u64) {
        self.counts.insert(name.to_string(), value);
    }

    pub fn current(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Run directory name for the next calculation of `name`.
    pub fn next_run_name(&mut self, name: &str) -> String {
        format!("{}{}", name, self.next(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent_per_name() {
        let mut counter = RunCounter::new();
        assert_eq!(counter.next_run_name("opt"), "opt1");
        assert_eq!(counter.next_run_name("opt"), "opt2");
        assert_eq!(counter.next_run_name("sp"), "sp1");
        assert_eq!(counter.current("opt"), 2);
        assert_eq!(counter.current("md"), 0);
    }

    #[test]
    fn set_restarts_a_counter() {
        let mut counter = RunCounter::new();
        counter.next("opt");
        counter.set("opt", 10);
        assert_eq!(counter.next("opt"), 11);
    }
}
