// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: 2026 NeatCommit Contributors

#![no_main]

use libfuzzer_sys::fuzz_target;
use neatcommit_core::{parse_repo_config, parse_repo_config_strict};

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        // The lenient parser never fails; a strictly valid file parses the same.
        let lenient = parse_repo_config(raw);
        if let Ok(strict) = parse_repo_config_strict(raw) {
            assert_eq!(strict.quality_gate, lenient.quality_gate);
        }
    }
});
