use std::sync::atomic::{AtomicUsize, Ordering};

use camaudit_common::network::target::Target;
use camaudit_core::probe::ProbeOutcome;
use camaudit_core::scanner::{ScanObserver, ScanReport};
use indicatif::ProgressStyle;
use tokio::task::JoinError;
use tracing::{Span, debug, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::print;

/// Progress bar for a search, driven by the orchestrator.
pub struct ScanProgress {
    span: Span,
    total: AtomicUsize,
    done: AtomicUsize,
}

impl ScanProgress {
    pub fn new() -> Self {
        let span = info_span!("search", indicatif.pb_show = true);
        let style = ProgressStyle::with_template(
            "{spinner:.blue} [{bar:32.green/bright_black}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▆▁")
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);
        span.pb_set_style(&style);
        span.pb_set_message("Please wait...");

        Self {
            span,
            total: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    fn advance(&self, count: usize) {
        let done = self.done.fetch_add(count, Ordering::Relaxed) + count;

        // The provider may hand out more candidates than it announced.
        if done > self.total.load(Ordering::Relaxed) {
            self.total.store(done, Ordering::Relaxed);
            self.span.pb_set_length(done as u64);
        }
        self.span.pb_inc(count as u64);
    }
}

impl ScanObserver for ScanProgress {
    fn started(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.span.pb_set_length(total as u64);
        print::trying_hosts(total);
    }

    fn advanced(&self, target: &Target, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Matched(record) => print::login_success(record),
            other => debug!(%target, "{other}"),
        }
        self.advance(1);
    }

    fn crashed(&self, _error: &JoinError) {
        self.advance(1);
    }

    fn skipped(&self, count: usize) {
        debug!(count, "unusable search results");
        self.advance(count);
    }

    // Fewer candidates than announced: end the bar where the run ended.
    fn finished(&self, _report: &ScanReport) {
        let done = self.done.load(Ordering::Relaxed);
        if done < self.total.load(Ordering::Relaxed) {
            self.total.store(done, Ordering::Relaxed);
            self.span.pb_set_length(done as u64);
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
