// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop/CI bridge for hosts without a mobile runtime.
//
// Build facts come from DMI (`/sys/class/dmi/id`) and `/proc/sys/kernel` on
// Linux. Facts a desktop has no equivalent for are left empty or reported as
// `PlatformUnavailable`. Probes delegate to the host implementations.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use devprobe_core::error::{DevprobeError, Result};
use devprobe_core::{EnvironmentSnapshot, ProbeError};
use devprobe_detect::probe::{FilesystemProbe, HostProbe, NetworkProbe};

use crate::traits::*;

/// Bridge returned on non-mobile platforms.
pub struct DesktopBridge {
    /// Root of the sysfs/procfs tree; `/` outside tests.
    root: PathBuf,
    probe: HostProbe,
}

impl DesktopBridge {
    pub fn new() -> Self {
        Self::with_root("/")
    }

    /// Read host facts below `root` instead of `/`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            probe: HostProbe,
        }
    }

    /// Trimmed contents of a small host file, or `None` if unreadable.
    fn read_fact(&self, relative: &str) -> Option<String> {
        let path = self.root.join(relative);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents.trim().to_owned()),
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "host fact unavailable");
                None
            }
        }
    }

    fn fact_or_empty(&self, relative: &str) -> String {
        self.read_fact(relative).unwrap_or_default()
    }
}

impl Default for DesktopBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for DesktopBridge {
    fn platform_name(&self) -> &str {
        "Desktop"
    }
}

impl NativeBuildInfo for DesktopBridge {
    fn environment_snapshot(&self) -> Result<EnvironmentSnapshot> {
        if !cfg!(target_os = "linux") {
            return Err(DevprobeError::PlatformUnavailable);
        }

        Ok(EnvironmentSnapshot {
            manufacturer: self.fact_or_empty("sys/class/dmi/id/sys_vendor"),
            brand: self.fact_or_empty("sys/class/dmi/id/board_vendor"),
            device: self.fact_or_empty("sys/class/dmi/id/product_family"),
            model: self.fact_or_empty("sys/class/dmi/id/product_name"),
            product: self.fact_or_empty("sys/class/dmi/id/product_version"),
            hardware: std::env::consts::ARCH.to_owned(),
            fingerprint: String::new(),
            board: self.fact_or_empty("sys/class/dmi/id/board_name"),
            bootloader: self.fact_or_empty("sys/class/dmi/id/bios_version"),
            serial: self.fact_or_empty("sys/class/dmi/id/product_serial"),
            host: self.fact_or_empty("proc/sys/kernel/hostname"),
        })
    }

    /// Kernel release, or the OS name where procfs has none.
    fn os_version(&self) -> Result<String> {
        Ok(self
            .read_fact("proc/sys/kernel/osrelease")
            .unwrap_or_else(|| std::env::consts::OS.to_owned()))
    }

    fn sdk_version(&self) -> Result<u32> {
        Ok(0)
    }

    fn serial_number(&self) -> Result<String> {
        // Usually root-only; an empty serial is the normal desktop answer.
        Ok(self.fact_or_empty("sys/class/dmi/id/product_serial"))
    }
}

impl NativeIdentity for DesktopBridge {
    fn device_id(&self) -> Result<Option<String>> {
        Ok(self
            .read_fact("etc/machine-id")
            .filter(|id| !id.is_empty()))
    }

    fn raw_gsf_id(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn files_dir(&self) -> Result<String> {
        Ok(data_dir().display().to_string())
    }

    fn time_zone_id(&self) -> Result<String> {
        if let Ok(tz) = std::env::var("TZ") {
            return Ok(tz.trim_start_matches(':').to_owned());
        }
        if let Some(tz) = self.read_fact("etc/timezone") {
            return Ok(tz);
        }
        let link = std::fs::read_link(self.root.join("etc/localtime"))?;
        zone_from_localtime(&link).ok_or(DevprobeError::PlatformUnavailable)
    }
}

impl FilesystemProbe for DesktopBridge {
    fn exists(&self, path: &Path) -> bool {
        self.probe.exists(path)
    }

    fn read_prefix(&self, path: &Path, max_bytes: usize) -> std::result::Result<Vec<u8>, ProbeError> {
        self.probe.read_prefix(path, max_bytes)
    }
}

impl NetworkProbe for DesktopBridge {
    fn permission_granted(&self) -> bool {
        self.probe.permission_granted()
    }

    fn interface_addresses(&self) -> std::result::Result<Vec<IpAddr>, ProbeError> {
        self.probe.interface_addresses()
    }
}

/// Application data directory following XDG conventions.
pub fn data_dir() -> PathBuf {
    dirs_fallback().join("devprobe")
}

fn dirs_fallback() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    PathBuf::from("/tmp")
}

/// `/usr/share/zoneinfo/Europe/Berlin` -> `Europe/Berlin`.
fn zone_from_localtime(link: &Path) -> Option<String> {
    let text = link.to_str()?;
    let (_, zone) = text.split_once("zoneinfo/")?;
    (!zone.is_empty()).then(|| zone.to_owned())
}
