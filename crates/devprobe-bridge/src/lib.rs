// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// devprobe-bridge: native fact sources and the `getDeviceInfo` plugin.
//
// Android reads build facts over JNI. Every other target reads them from
// the host filesystem (DMI, kernel release, machine id).

pub mod device_info;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod desktop;

pub use device_info::{DeviceInfoPlugin, GET_DEVICE_INFO, PluginCallback};
pub use traits::{NativeBuildInfo, NativeIdentity, PlatformBridge};

/// Bridge implementation for the target operating system.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    #[cfg(target_os = "android")]
    {
        Box::new(android::AndroidBridge::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        Box::new(desktop::DesktopBridge::new())
    }
}
