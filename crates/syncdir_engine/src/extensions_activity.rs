//! Per-extension bookmark write tracking.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use syncdir_protocol::ExtensionActivityRecord;

/// Activity records keyed by extension ID.
pub type ExtensionsActivityRecords = BTreeMap<String, ExtensionActivityRecord>;

/// Counts bookmark writes made by extensions between commits.
///
/// The sync cycle drains the counts into its session before a commit and
/// hands them back if no bookmark commit succeeded, so they are reported
/// on the next attempt instead of being lost.
#[derive(Debug, Default)]
pub struct ExtensionsActivityMonitor {
    records: Mutex<ExtensionsActivityRecords>,
}

impl ExtensionsActivityMonitor {
    /// Creates a monitor with no recorded activity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one bookmark write by `extension_id`.
    pub fn on_bookmark_write(&self, extension_id: &str) {
        let mut records = self.records.lock();
        let record = records
            .entry(extension_id.to_string())
            .or_insert_with(|| ExtensionActivityRecord {
                extension_id: extension_id.to_string(),
                bookmark_write_count: 0,
            });
        record.bookmark_write_count += 1;
    }

    /// Takes every record, leaving the monitor empty.
    pub fn get_and_clear_records(&self) -> ExtensionsActivityRecords {
        std::mem::take(&mut *self.records.lock())
    }

    /// Merges `records` back, adding counts to any recorded since.
    pub fn put_records(&self, records: &ExtensionsActivityRecords) {
        let mut current = self.records.lock();
        for (extension_id, record) in records {
            let entry = current
                .entry(extension_id.clone())
                .or_insert_with(|| ExtensionActivityRecord {
                    extension_id: extension_id.clone(),
                    bookmark_write_count: 0,
                });
            entry.bookmark_write_count += record.bookmark_write_count;
        }
    }

    /// Returns the number of extensions with recorded activity.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
