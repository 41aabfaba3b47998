// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filesystem matcher: emulator marker files and QEMU driver strings.

use std::path::Path;

use devprobe_core::Signal;
use tracing::{debug, trace};

use crate::probe::FilesystemProbe;
use crate::signatures::{MarkerSet, SignatureDatabase};

/// Run every marker category, then the driver scan. Existence checks are
/// cheap, so they go first.
pub fn check<P: FilesystemProbe + ?Sized>(probe: &P, db: &SignatureDatabase) -> Option<Signal> {
    db.marker_sets
        .iter()
        .find_map(|set| check_files(probe, set))
        .or_else(|| check_qemu_drivers(probe, db))
}

/// First existing path of `set`, if any.
pub fn check_files<P: FilesystemProbe + ?Sized>(probe: &P, set: &MarkerSet) -> Option<Signal> {
    let path = set.paths.iter().find(|path| probe.exists(Path::new(path)))?;
    debug!(category = ?set.category, path, "emulator marker file present");
    Some(Signal::MarkerFile {
        category: set.category,
        path: (*path).to_owned(),
    })
}

/// Scan the head of each driver-info file for a known QEMU driver name.
///
/// Unreadable files are skipped; invalid UTF-8 is decoded lossily.
pub fn check_qemu_drivers<P: FilesystemProbe + ?Sized>(
    probe: &P,
    db: &SignatureDatabase,
) -> Option<Signal> {
    for path in db.driver_files {
        let bytes = match probe.read_prefix(Path::new(path), db.driver_read_limit) {
            Ok(bytes) => bytes,
            Err(e) => {
                trace!(path, error = %e, "driver file unreadable, skipping");
                continue;
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        if let Some(driver) = db.qemu_drivers.iter().find(|d| text.contains(*d)) {
            debug!(path, driver, "QEMU driver found");
            return Some(Signal::QemuDriver {
                path: (*path).to_owned(),
                driver: (*driver).to_owned(),
            });
        }
    }
    None
}
