// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: 2026 NeatCommit Contributors

#![no_main]

use libfuzzer_sys::fuzz_target;
use neatcommit_core::SecurityScanner;

fuzz_target!(|data: &[u8]| {
    if let Ok(diff) = std::str::from_utf8(data) {
        let scanner = SecurityScanner::new();
        for finding in scanner.scan_diff(diff) {
            assert!(finding.line_number > 0);
        }
    }
});
