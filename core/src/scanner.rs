//! # Scan Orchestrator
//!
//! Drives the probe pipeline over every candidate a [`TargetSource`] hands out.
//!
//! The orchestrator task is the only reader of the discovery cursor and the
//! only writer of the [`ScanReport`]. Probes run on a bounded pool of tokio
//! tasks; their outcomes flow back through a `JoinSet`, so no state is shared
//! between workers. Output order follows completion, not discovery.
//!
//! Cancellation aborts in-flight probes. An aborted probe contributes
//! nothing; probes that already finished are kept.

use std::collections::HashSet;
use std::sync::Arc;

use camaudit_common::config::Config;
use camaudit_common::models::device::DeviceRecord;
use camaudit_common::network::target::Target;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info_span};

use crate::discovery::{DiscoveryError, TargetSource};
use crate::probe::{ProbeOutcome, Prober};

/// Receives progress as the scan advances. Called from the orchestrator task only.
pub trait ScanObserver: Send + Sync {
    /// Candidate count announced by the provider.
    fn started(&self, _total: usize) {}

    /// Exactly once per candidate that reached a terminal state.
    fn advanced(&self, _target: &Target, _outcome: &ProbeOutcome) {}

    /// A probe task died unexpectedly. Also counts as one processed candidate.
    fn crashed(&self, _error: &JoinError) {}

    /// `count` provider entries were unusable. Each counts as one processed candidate.
    fn skipped(&self, _count: usize) {}

    /// The run is over, whether exhausted, cancelled or failed.
    fn finished(&self, _report: &ScanReport) {}
}

impl ScanObserver for () {}

#[derive(Debug, Default)]
pub struct ScanReport {
    /// Candidate count announced up front.
    pub total: usize,
    /// Candidates that reached a terminal state.
    pub tried: usize,
    pub matches: Vec<DeviceRecord>,
    pub fingerprint_failed: usize,
    pub auth_failed: usize,
    pub out_of_scope: usize,
    pub duplicates: usize,
    /// Provider entries without a usable address or port.
    pub skipped: usize,
    pub errors: usize,
    pub cancelled: bool,
}

impl ScanReport {
    fn record(&mut self, observer: &dyn ScanObserver, target: &Target, outcome: ProbeOutcome) {
        self.tried += 1;
        observer.advanced(target, &outcome);

        match outcome {
            ProbeOutcome::Matched(record) => self.matches.push(*record),
            ProbeOutcome::FingerprintFailed => self.fingerprint_failed += 1,
            ProbeOutcome::AuthFailed => self.auth_failed += 1,
            ProbeOutcome::OutOfScope => self.out_of_scope += 1,
            ProbeOutcome::Duplicate => self.duplicates += 1,
        }
    }

    fn skip(&mut self, observer: &dyn ScanObserver, count: usize) {
        if count == 0 {
            return;
        }
        self.tried += count;
        self.skipped += count;
        observer.skipped(count);
    }

    fn collect(
        &mut self,
        observer: &dyn ScanObserver,
        joined: Result<(Target, ProbeOutcome), JoinError>,
    ) {
        match joined {
            Ok((target, outcome)) => self.record(observer, &target, outcome),
            Err(err) if err.is_cancelled() => {}
            Err(err) => {
                error!(error = %err, "probe task crashed");
                self.tried += 1;
                self.errors += 1;
                observer.crashed(&err);
            }
        }
    }
}

pub struct Orchestrator {
    prober: Arc<Prober>,
    workers: usize,
}

impl Orchestrator {
    pub fn new(prober: Prober, cfg: &Config) -> Self {
        Self {
            prober: Arc::new(prober),
            workers: cfg.workers.max(1),
        }
    }

    /// Runs the scan to completion or until `cancel` fires.
    ///
    /// Only discovery failures are errors; every per-target failure is an outcome.
    pub async fn run<S>(
        &self,
        source: &mut S,
        observer: &dyn ScanObserver,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, DiscoveryError>
    where
        S: TargetSource + ?Sized,
    {
        let total = source.total().await?;
        observer.started(total);

        let mut report = ScanReport {
            total,
            ..Default::default()
        };
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks: JoinSet<(Target, ProbeOutcome)> = JoinSet::new();
        let mut seen: HashSet<String> = HashSet::new();

        'pages: loop {
            let page = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    report.cancelled = true;
                    break 'pages;
                }
                page = source.next_page() => page,
            };

            let page = match page {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(err) => {
                    tasks.abort_all();
                    observer.finished(&report);
                    return Err(err);
                }
            };
            report.skip(observer, page.skipped);

            for target in page.targets {
                if !seen.insert(target.key()) {
                    report.record(observer, &target, ProbeOutcome::Duplicate);
                    continue;
                }

                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        report.cancelled = true;
                        break 'pages;
                    }
                    permit = Arc::clone(&semaphore).acquire_owned() => permit,
                };
                let Ok(permit) = permit else {
                    break 'pages;
                };

                while let Some(joined) = tasks.try_join_next() {
                    report.collect(observer, joined);
                }

                let prober = Arc::clone(&self.prober);
                let span = info_span!("probe", target = %target);
                tasks.spawn(
                    async move {
                        let _permit = permit;
                        let outcome = prober.probe(&target).await;
                        (target, outcome)
                    }
                    .instrument(span),
                );
            }
        }

        if report.cancelled {
            tasks.abort_all();
        }

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled(), if !report.cancelled => {
                    report.cancelled = true;
                    tasks.abort_all();
                    continue;
                }
                joined = tasks.join_next() => joined,
            };

            match joined {
                Some(joined) => report.collect(observer, joined),
                None => break,
            }
        }

        observer.finished(&report);
        Ok(report)
    }
}
