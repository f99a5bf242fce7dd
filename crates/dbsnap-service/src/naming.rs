// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Local};

/// `YYYYMMDDhhmmss`, second resolution.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Remote name for a snapshot taken at `at`: `<prefix>_<YYYYMMDDhhmmss>.db`.
///
/// Two backups in the same second get the same name and the later one
/// replaces the earlier in the store.
pub fn snapshot_name(prefix: &str, at: DateTime<Local>) -> String {
    format!("{prefix}_{}.db", at.format(TIMESTAMP_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_fixed_width_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(snapshot_name("wblog", at), "wblog_20240102030405.db");
    }

    #[test]
    fn generated_names_are_valid_leaf_names() {
        let at = Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let name = snapshot_name("wblog", at);
        assert!(dbsnap_security::LeafName::parse(&name).is_ok());
    }
}
