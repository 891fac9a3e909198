use std::time::Duration;

use camaudit_common::models::device::DeviceRecord;
use camaudit_core::catalog::{SyncStatus, SyncSummary};
use camaudit_core::scanner::ScanReport;
use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

/// Events on this target are printed verbatim, without a status symbol.
pub const PRINT_TARGET: &str = "camaudit::print";

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{msg}");
}

pub fn banner() {
    let text_content: String = format!("⟦ CAMAUDIT v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).bright_black();

    print(&format!("{}{}{}", sep, text, sep));
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}{}", space, msg, space));
}

pub fn tree_head(idx: usize, name: &str) {
    let idx_str: String = format!("[{}]", idx.to_string().color(colors::ACCENT));
    let output: String = format!(
        "{} {}",
        idx_str.color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    );
    print(&output);
}

pub fn as_tree_one_level(key_value_pair: Vec<(String, ColoredString)>) {
    let width: usize = key_value_pair.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    for (i, (key, value)) in key_value_pair.iter().enumerate() {
        let last: bool = i + 1 == key_value_pair.len();
        let branch: ColoredString = if !last {
            "├─".bright_black()
        } else {
            "└─".bright_black()
        };
        let output: String = format!(
            " {} {}{}{} {}",
            branch,
            key.color(colors::TEXT_DEFAULT),
            ".".repeat(width - key.len()).color(colors::SEPARATOR),
            ":".color(colors::SEPARATOR),
            value
        );
        print(&output);
    }
}

pub fn trying_hosts(total: usize) {
    info!("Trying out {} hosts!", total.to_string().bold());
}

pub fn login_success(record: &DeviceRecord) {
    info!(
        "{} Address: {}",
        "Success! Logged in!".italic().green(),
        record.key().color(colors::PRIMARY)
    );
    print(&format!(" - Cameras: {}", record.channels.len()));
    print(&format!(" - Users: {}", record.users.len()));
}

pub fn login_failure(address: &str, reason: &str) {
    tracing::error!(
        "{} Address: {} ({})",
        "Failure! Wrong password or offline!".italic().red(),
        address.color(colors::PRIMARY),
        reason
    );
}

pub fn scan_summary(report: &ScanReport, total_time: Duration) {
    let found: ColoredString = format!("{}/{}", report.matches.len(), report.tried).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Search done! Found {found} matches in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    fat_separator();
    centerln(&output);

    let mut notes: Vec<String> = Vec::new();
    if report.out_of_scope > 0 {
        notes.push(format!("{} out of scope", report.out_of_scope));
    }
    if report.skipped > 0 {
        notes.push(format!("{} unusable results", report.skipped));
    }
    if report.duplicates > 0 {
        notes.push(format!("{} duplicates", report.duplicates));
    }
    if report.errors > 0 {
        notes.push(format!("{} errors", report.errors));
    }
    if report.tried < report.total {
        notes.push(format!("{} announced", report.total));
    }
    if !notes.is_empty() {
        centerln(&notes.join(", ").color(colors::SEPARATOR).to_string());
    }
    if report.cancelled {
        tracing::warn!("Search was interrupted, results are partial");
    }
}

pub fn sync_status(idx: usize, record: &DeviceRecord, status: &SyncStatus) {
    let key = record.key();
    match status {
        SyncStatus::Added => info!("{idx}. {} {key}", "Success! Added to database...".italic().green()),
        SyncStatus::AlreadyKnown => {
            tracing::warn!("{idx}. {} {key}", "Already added to database...".italic().red())
        }
        SyncStatus::Failed(err) => tracing::error!("{idx}. {key} could not be saved: {err}"),
    }
}

pub fn sync_summary(summary: &SyncSummary, matches: usize) {
    let added: ColoredString = summary.added.to_string().bold().green();
    let mut line = format!("Synchronized! Added {added} entries from {matches} matches");
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed.to_string().bold().red()));
    }
    fat_separator();
    centerln(&line);
}

const NO_RESULTS_0: &str = r#"
                       _  _    ___  _  _
                      | || |  / _ \| || |
                      | || |_| | | | || |_
                      |__   _| |_| |__   _|
         _   _  ___ _____|_|__\___/__ |_|  _ _   _ ____
        | \ | |/ _ \_   _| |  ___/ _ \| | | | \ | |  _ \
        |  \| | | | || |   | |_ | | | | | | |  \| | | | |
        | |\  | |_| || |   |  _|| |_| | |_| | |\  | |_| |
        |_| \_|\___/ |_|   |_|   \___/ \___/|_| \_|____/
"#;

pub fn no_results() {
    print(&format!("{}", NO_RESULTS_0.red().bold()));
}

pub fn end_of_program() {
    print(&format!(
        "{}",
        "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)
    ));
}
