// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// The bridge supplies raw device facts. The classifier's probes
// (`FilesystemProbe`, `NetworkProbe`) are part of the bridge so a single
// object can answer a whole `getDeviceInfo` request.

use devprobe_core::EnvironmentSnapshot;
use devprobe_core::error::Result;
use devprobe_detect::{FilesystemProbe, NetworkProbe};

/// Unified bridge that groups all native capabilities.
pub trait PlatformBridge: NativeBuildInfo + NativeIdentity + FilesystemProbe + NetworkProbe {
    /// Platform name reported to the web view (e.g. "Android").
    fn platform_name(&self) -> &str;
}

/// Build metadata of the running OS image.
pub trait NativeBuildInfo {
    /// Build strings used by the emulator classifier. Fields the platform
    /// cannot provide are left empty.
    fn environment_snapshot(&self) -> Result<EnvironmentSnapshot>;

    /// OS release string (e.g. "14").
    fn os_version(&self) -> Result<String>;

    /// API level. Zero on platforms without one.
    fn sdk_version(&self) -> Result<u32>;

    /// Hardware serial number as far as the platform reveals it.
    fn serial_number(&self) -> Result<String>;
}

/// Per-installation identifiers and locations.
pub trait NativeIdentity {
    /// Stable device id (ANDROID_ID on Android). `None` if unavailable.
    fn device_id(&self) -> Result<Option<String>>;

    /// Raw Google services framework id, as the decimal string stored by
    /// the provider. `None` if the provider is missing.
    fn raw_gsf_id(&self) -> Result<Option<String>>;

    /// Application files directory.
    fn files_dir(&self) -> Result<String>;

    /// Default time zone id (e.g. "Europe/London").
    fn time_zone_id(&self) -> Result<String>;
}
