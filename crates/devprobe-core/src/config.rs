// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DevprobeError, Result};

/// Which rule set the build-string matcher applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicPolicy {
    /// Any single known signature marks the host as virtual.
    #[default]
    DirectHit,
    /// Weak signals are counted and must reach the database threshold.
    /// Strong signatures still short-circuit.
    Scored,
}

/// Settings for the virtualization classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Build-string policy.
    pub basic_policy: BasicPolicy,
    /// Compare the first non-loopback IPv4 address against the emulator NAT address.
    pub network_check: bool,
    /// Probe marker files and driver-info files.
    pub filesystem_check: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            basic_policy: BasicPolicy::DirectHit,
            network_check: true,
            filesystem_check: true,
        }
    }
}

impl DetectorConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DevprobeError::Config(e.to_string()))
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
