use camaudit_common::models::device::DeviceRecord;
use camaudit_core::catalog::SyncStatus;
use colored::*;

use crate::terminal::print;

type Detail = (String, ColoredString);

fn or_unknown(value: Option<&str>) -> ColoredString {
    match value {
        Some(v) => v.normal(),
        None => "unknown".dimmed(),
    }
}

pub fn record_details(record: &DeviceRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("Link".to_string(), record.target.link().normal()),
        ("Login".to_string(), record.credential.username.as_str().green()),
    ];

    if let Some(info) = &record.device_info {
        details.push(("Name".to_string(), or_unknown(info.name.as_deref())));
        details.push(("Model".to_string(), or_unknown(info.model.as_deref())));
        details.push(("Firmware".to_string(), or_unknown(info.firmware.as_deref())));
    }

    details.push(("Cameras".to_string(), record.channels.len().to_string().normal()));
    details.push(("Users".to_string(), record.users.len().to_string().normal()));
    details
}

pub fn print_record_tree(idx: usize, record: &DeviceRecord) {
    print::tree_head(idx, &record.key());
    print::as_tree_one_level(record_details(record));
}

/// Document to show under a sync line. Failed writes get none.
pub fn synced_document(record: &DeviceRecord, status: &SyncStatus) -> Option<String> {
    match status {
        SyncStatus::Added | SyncStatus::AlreadyKnown => Some(record.to_pretty_json()),
        SyncStatus::Failed(_) => None,
    }
}
