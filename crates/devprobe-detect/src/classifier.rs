// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Virtualization classifier: runs the matchers in order, first hit wins.

use devprobe_core::{DetectorConfig, EnvironmentSnapshot, MatchResult, Matcher};
use tracing::debug;

use crate::probe::EnvironmentProbe;
use crate::signatures::SignatureDatabase;
use crate::{basic, filesystem, network};

/// Decides whether the current host is an emulator or virtual machine.
///
/// The classifier holds no mutable state. Every call re-reads the probes,
/// so a verdict can change between calls when the host does (for example
/// when a network interface comes up).
#[derive(Debug, Clone, Copy)]
pub struct VirtualizationClassifier<'db> {
    signatures: &'db SignatureDatabase,
    config: DetectorConfig,
}

impl VirtualizationClassifier<'static> {
    /// Classifier over the built-in signature database.
    pub fn new(config: DetectorConfig) -> Self {
        Self::with_signatures(SignatureDatabase::current(), config)
    }
}

impl Default for VirtualizationClassifier<'static> {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl<'db> VirtualizationClassifier<'db> {
    pub fn with_signatures(signatures: &'db SignatureDatabase, config: DetectorConfig) -> Self {
        Self { signatures, config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn signatures(&self) -> &'db SignatureDatabase {
        self.signatures
    }

    /// Classify the host and report which matcher fired.
    ///
    /// Order: build strings, then the network address (when enabled and
    /// permitted), then the filesystem (when enabled).
    pub fn classify<P: EnvironmentProbe + ?Sized>(
        &self,
        snapshot: &EnvironmentSnapshot,
        probe: &P,
    ) -> MatchResult {
        let db = self.signatures;

        if let Some(signal) = basic::check(snapshot, db, self.config.basic_policy) {
            return MatchResult::virtual_host(Matcher::Basic, signal);
        }

        if self.config.network_check {
            if let Some(signal) = network::check_ip(probe, db) {
                return MatchResult::virtual_host(Matcher::Network, signal);
            }
        }

        if self.config.filesystem_check {
            if let Some(signal) = filesystem::check(probe, db) {
                return MatchResult::virtual_host(Matcher::Filesystem, signal);
            }
        }

        debug!(revision = db.revision, "no emulator signatures found");
        MatchResult::physical()
    }

    pub fn is_virtual<P: EnvironmentProbe + ?Sized>(
        &self,
        snapshot: &EnvironmentSnapshot,
        probe: &P,
    ) -> bool {
        self.classify(snapshot, probe).is_virtual
    }
}
