// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for device facts and virtualization verdicts.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// A single build-metadata field of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildField {
    Manufacturer,
    Brand,
    Device,
    Model,
    Product,
    Hardware,
    Fingerprint,
    Board,
    Bootloader,
    Serial,
    Host,
}

impl BuildField {
    pub const ALL: [BuildField; 11] = [
        Self::Manufacturer,
        Self::Brand,
        Self::Device,
        Self::Model,
        Self::Product,
        Self::Hardware,
        Self::Fingerprint,
        Self::Board,
        Self::Bootloader,
        Self::Serial,
        Self::Host,
    ];

    /// Lowercase field name, as used in logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Manufacturer => "manufacturer",
            Self::Brand => "brand",
            Self::Device => "device",
            Self::Model => "model",
            Self::Product => "product",
            Self::Hardware => "hardware",
            Self::Fingerprint => "fingerprint",
            Self::Board => "board",
            Self::Bootloader => "bootloader",
            Self::Serial => "serial",
            Self::Host => "host",
        }
    }
}

impl std::fmt::Display for BuildField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Build facts read from the host for a single classification call.
///
/// Fields the platform cannot supply are left empty; an empty string never
/// matches a signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSnapshot {
    pub manufacturer: String,
    pub brand: String,
    pub device: String,
    pub model: String,
    pub product: String,
    pub hardware: String,
    pub fingerprint: String,
    pub board: String,
    pub bootloader: String,
    pub serial: String,
    pub host: String,
}

impl EnvironmentSnapshot {
    pub fn field(&self, field: BuildField) -> &str {
        match field {
            BuildField::Manufacturer => &self.manufacturer,
            BuildField::Brand => &self.brand,
            BuildField::Device => &self.device,
            BuildField::Model => &self.model,
            BuildField::Product => &self.product,
            BuildField::Hardware => &self.hardware,
            BuildField::Fingerprint => &self.fingerprint,
            BuildField::Board => &self.board,
            BuildField::Bootloader => &self.bootloader,
            BuildField::Serial => &self.serial,
            BuildField::Host => &self.host,
        }
    }

    pub fn set_field(&mut self, field: BuildField, value: impl Into<String>) {
        let slot = match field {
            BuildField::Manufacturer => &mut self.manufacturer,
            BuildField::Brand => &mut self.brand,
            BuildField::Device => &mut self.device,
            BuildField::Model => &mut self.model,
            BuildField::Product => &mut self.product,
            BuildField::Hardware => &mut self.hardware,
            BuildField::Fingerprint => &mut self.fingerprint,
            BuildField::Board => &mut self.board,
            BuildField::Bootloader => &mut self.bootloader,
            BuildField::Serial => &mut self.serial,
            BuildField::Host => &mut self.host,
        };
        *slot = value.into();
    }

    /// Builder-style setter, mostly for tests and synthetic snapshots.
    pub fn with(mut self, field: BuildField, value: impl Into<String>) -> Self {
        self.set_field(field, value);
        self
    }
}

/// Groups of marker files left behind by specific emulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCategory {
    Genymotion,
    Andy,
    Nox,
    X86,
    QemuPipes,
}

/// Which matcher produced a positive verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    Basic,
    Network,
    Filesystem,
}

/// The concrete signature that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    /// A named build-string rule matched. `field` is the rule's first condition.
    Build { rule: String, field: BuildField },
    /// Enough weak build signals accumulated under the scored policy.
    Score { score: u32, threshold: u32 },
    /// A known marker file exists.
    MarkerFile { category: MarkerCategory, path: String },
    /// A driver-info file mentions a QEMU driver.
    QemuDriver { path: String, driver: String },
    /// The first non-loopback IPv4 address is the emulator NAT address.
    EmulatorAddress { address: Ipv4Addr },
}

/// Matcher plus signal, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub matcher: Matcher,
    pub signal: Signal,
}

/// Result of one classification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub is_virtual: bool,
    pub evidence: Option<Evidence>,
}

impl MatchResult {
    /// No matcher fired.
    pub fn physical() -> Self {
        Self {
            is_virtual: false,
            evidence: None,
        }
    }

    pub fn virtual_host(matcher: Matcher, signal: Signal) -> Self {
        Self {
            is_virtual: true,
            evidence: Some(Evidence { matcher, signal }),
        }
    }

    pub fn matcher(&self) -> Option<Matcher> {
        self.evidence.as_ref().map(|e| e.matcher)
    }
}

/// Reply of the `getDeviceInfo` action, serialized with camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Platform device id (ANDROID_ID, machine-id on desktop).
    pub uuid: Option<String>,
    /// Google services framework id, uppercase hex.
    pub gsf_id: Option<String>,
    /// Application files directory.
    pub directory: String,
    /// OS release string.
    pub version: String,
    pub platform: String,
    pub model: String,
    pub manufacturer: String,
    pub is_virtual: bool,
    pub serial: String,
}
