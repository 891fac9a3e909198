use std::time::Duration;

/// Per-request timeout applied to every device request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of targets probed at the same time during a search.
pub const DEFAULT_WORKERS: usize = 16;

/// Runtime knobs shared by the probe pipeline and the scan orchestrator.
#[derive(Debug, Clone)]
pub struct Config {
    /// Timeout for each individual HTTP request sent to a device.
    ///
    /// The fingerprint, the credential check and every inventory read
    /// get their own budget; one timing out does not cut the others short.
    pub timeout: Duration,
    /// Size of the worker pool. Always at least one.
    pub workers: usize,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            workers: DEFAULT_WORKERS,
            verbose: false,
        }
    }
}

impl Config {
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(1));
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}
