// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `getDeviceInfo`: the request/response surface exposed to the web view.
//
// The plugin gathers facts from the platform bridge, runs the virtualization
// classifier, and hands a single JSON reply to the caller's callback.

use devprobe_core::error::Result;
use devprobe_core::{DetectorConfig, DeviceInfo, EnvironmentSnapshot};
use devprobe_detect::VirtualizationClassifier;
use tracing::{debug, info, warn};

use crate::traits::{NativeBuildInfo, NativeIdentity, PlatformBridge};

/// The only action this plugin answers.
pub const GET_DEVICE_INFO: &str = "getDeviceInfo";

const AMAZON_MANUFACTURER: &str = "Amazon";
const AMAZON_PLATFORM: &str = "amazon-fireos";

/// Receives the outcome of an action, mirroring the web view's
/// success/error callback pair.
pub trait PluginCallback {
    fn success(&self, reply: serde_json::Value);
    fn error(&self, message: String);
}

/// Where the serial number comes from on a given API level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialSource {
    /// The public `Build.SERIAL` field (API < 26).
    BuildField,
    /// `Build.getSerial()`, which needs READ_PHONE_STATE (API 26..=28).
    PrivilegedGetter,
    /// Not readable by third-party apps (API >= 29).
    Unavailable,
}

pub fn serial_source(sdk_version: u32) -> SerialSource {
    match sdk_version {
        0..=25 => SerialSource::BuildField,
        26..=28 => SerialSource::PrivilegedGetter,
        _ => SerialSource::Unavailable,
    }
}

/// Amazon devices report their own platform name.
pub fn resolve_platform(platform_name: &str, manufacturer: &str) -> String {
    if manufacturer == AMAZON_MANUFACTURER {
        AMAZON_PLATFORM.to_owned()
    } else {
        platform_name.to_owned()
    }
}

/// Render the decimal GSF id as uppercase hex.
///
/// The provider stores a signed 64-bit value; negative ids are rendered in
/// two's complement. Unparseable input yields `None`.
pub fn normalize_gsf_id(raw: &str) -> Option<String> {
    let value: i64 = raw.trim().parse().ok()?;
    Some(format!("{:X}", value as u64))
}

/// Whether a GSF provider cursor holds an id: a first row with the value in
/// column 1.
pub fn gsf_row_usable(has_row: bool, columns: i32) -> bool {
    has_row && columns >= 2
}

/// Device-info plugin bound to one platform bridge.
pub struct DeviceInfoPlugin {
    bridge: Box<dyn PlatformBridge>,
    classifier: VirtualizationClassifier<'static>,
    /// Device id, read once at construction.
    uuid: Option<String>,
}

impl DeviceInfoPlugin {
    pub fn new(bridge: Box<dyn PlatformBridge>, config: DetectorConfig) -> Self {
        let uuid = bridge.device_id().unwrap_or_else(|e| {
            warn!(error = %e, "device id unavailable");
            None
        });
        info!(platform = bridge.platform_name(), "device info plugin initialised");
        Self {
            bridge,
            classifier: VirtualizationClassifier::new(config),
            uuid,
        }
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    pub fn bridge(&self) -> &dyn PlatformBridge {
        self.bridge.as_ref()
    }

    /// Dispatch an action from the web view.
    ///
    /// Returns `false` for unknown actions without invoking the callback.
    pub fn execute(&self, action: &str, callback: &dyn PluginCallback) -> bool {
        if action != GET_DEVICE_INFO {
            debug!(action, "unsupported action");
            return false;
        }

        match self.device_info().and_then(|info| Ok(serde_json::to_value(info)?)) {
            Ok(reply) => callback.success(reply),
            Err(e) => {
                warn!(error = %e, "getDeviceInfo failed");
                callback.error(e.to_string());
            }
        }
        true
    }

    /// Collect device facts and classify the host.
    pub fn device_info(&self) -> Result<DeviceInfo> {
        let snapshot = self.bridge.environment_snapshot().unwrap_or_else(|e| {
            warn!(error = %e, "build facts unavailable, classifying an empty snapshot");
            EnvironmentSnapshot::default()
        });

        let verdict = self.classifier.classify(&snapshot, self.bridge.as_ref());
        if let Some(evidence) = &verdict.evidence {
            info!(matcher = ?evidence.matcher, signal = ?evidence.signal, "host classified as virtual");
        }

        let serial = self.bridge.serial_number().unwrap_or_else(|e| {
            debug!(error = %e, "serial number unavailable");
            String::new()
        });

        Ok(DeviceInfo {
            uuid: self.uuid.clone(),
            gsf_id: self.gsf_id(),
            directory: self.bridge.files_dir()?,
            version: self.bridge.os_version()?,
            platform: resolve_platform(self.bridge.platform_name(), &snapshot.manufacturer),
            model: snapshot.model,
            manufacturer: snapshot.manufacturer,
            is_virtual: verdict.is_virtual,
            serial,
        })
    }

    /// `""` when the provider has no id, `None` when it cannot be read or
    /// parsed.
    fn gsf_id(&self) -> Option<String> {
        match self.bridge.raw_gsf_id() {
            Ok(Some(raw)) => normalize_gsf_id(&raw),
            Ok(None) => Some(String::new()),
            Err(e) => {
                debug!(error = %e, "GSF id unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::net::IpAddr;
    use std::path::Path;

    use devprobe_core::error::DevprobeError;
    use devprobe_core::ProbeError;
    use devprobe_detect::{FilesystemProbe, NetworkProbe};

    use super::*;

    struct FakeBridge {
        snapshot: Option<EnvironmentSnapshot>,
        addresses: Vec<IpAddr>,
        gsf: Option<String>,
        gsf_readable: bool,
        version: Option<String>,
    }

    impl FakeBridge {
        fn pixel() -> Self {
            Self {
                snapshot: Some(EnvironmentSnapshot {
                    manufacturer: "Google".into(),
                    brand: "google".into(),
                    device: "shiba".into(),
                    model: "Pixel 8".into(),
                    product: "shiba".into(),
                    hardware: "shiba".into(),
                    fingerprint: "google/shiba/shiba:14/AP2A.240805.005/12025142:user/release-keys"
                        .into(),
                    ..Default::default()
                }),
                addresses: vec!["127.0.0.1".parse().unwrap(), "192.168.1.23".parse().unwrap()],
                gsf: Some("3974589237465091234".into()),
                gsf_readable: true,
                version: Some("14".into()),
            }
        }
    }

    impl PlatformBridge for FakeBridge {
        fn platform_name(&self) -> &str {
            "Android"
        }
    }

    impl NativeBuildInfo for FakeBridge {
        fn environment_snapshot(&self) -> Result<EnvironmentSnapshot> {
            self.snapshot.clone().ok_or(DevprobeError::PlatformUnavailable)
        }

        fn os_version(&self) -> Result<String> {
            self.version.clone().ok_or(DevprobeError::PlatformUnavailable)
        }

        fn sdk_version(&self) -> Result<u32> {
            Ok(34)
        }

        fn serial_number(&self) -> Result<String> {
            Err(DevprobeError::Bridge("SecurityException".into()))
        }
    }

    impl NativeIdentity for FakeBridge {
        fn device_id(&self) -> Result<Option<String>> {
            Ok(Some("9774d56d682e549c".into()))
        }

        fn raw_gsf_id(&self) -> Result<Option<String>> {
            if !self.gsf_readable {
                return Err(DevprobeError::Bridge("SQLiteException".into()));
            }
            Ok(self.gsf.clone())
        }

        fn files_dir(&self) -> Result<String> {
            Ok("/data/user/0/org.example.app/files".into())
        }

        fn time_zone_id(&self) -> Result<String> {
            Ok("Europe/Berlin".into())
        }
    }

    impl FilesystemProbe for FakeBridge {
        fn exists(&self, _path: &Path) -> bool {
            false
        }

        fn read_prefix(
            &self,
            _path: &Path,
            _max_bytes: usize,
        ) -> std::result::Result<Vec<u8>, ProbeError> {
            Err(ProbeError::NotFound)
        }
    }

    impl NetworkProbe for FakeBridge {
        fn permission_granted(&self) -> bool {
            true
        }

        fn interface_addresses(&self) -> std::result::Result<Vec<IpAddr>, ProbeError> {
            Ok(self.addresses.clone())
        }
    }

    #[derive(Default)]
    struct Recorder {
        successes: RefCell<Vec<serde_json::Value>>,
        errors: RefCell<Vec<String>>,
    }

    impl PluginCallback for Recorder {
        fn success(&self, reply: serde_json::Value) {
            self.successes.borrow_mut().push(reply);
        }

        fn error(&self, message: String) {
            self.errors.borrow_mut().push(message);
        }
    }

    fn plugin(bridge: FakeBridge) -> DeviceInfoPlugin {
        DeviceInfoPlugin::new(Box::new(bridge), DetectorConfig::default())
    }

    #[test]
    fn reply_for_a_physical_phone() {
        let recorder = Recorder::default();
        assert!(plugin(FakeBridge::pixel()).execute(GET_DEVICE_INFO, &recorder));

        let replies = recorder.successes.borrow();
        assert_eq!(replies.len(), 1);
        let reply = &replies[0];
        assert_eq!(reply["uuid"], "9774d56d682e549c");
        assert_eq!(reply["gsfId"], "372893DA6B328CA2");
        assert_eq!(reply["directory"], "/data/user/0/org.example.app/files");
        assert_eq!(reply["version"], "14");
        assert_eq!(reply["platform"], "Android");
        assert_eq!(reply["model"], "Pixel 8");
        assert_eq!(reply["manufacturer"], "Google");
        assert_eq!(reply["isVirtual"], false);
        assert_eq!(reply["serial"], "");
        assert!(recorder.errors.borrow().is_empty());
    }

    #[test]
    fn emulator_address_marks_reply_virtual() {
        let mut bridge = FakeBridge::pixel();
        bridge.addresses = vec!["10.0.2.15".parse().unwrap()];
        assert!(plugin(bridge).device_info().unwrap().is_virtual);
    }

    #[test]
    fn unknown_action_is_rejected_silently() {
        let recorder = Recorder::default();
        assert!(!plugin(FakeBridge::pixel()).execute("getBatteryInfo", &recorder));
        assert!(recorder.successes.borrow().is_empty());
        assert!(recorder.errors.borrow().is_empty());
    }

    #[test]
    fn bridge_failure_reaches_error_callback() {
        let mut bridge = FakeBridge::pixel();
        bridge.version = None;
        let recorder = Recorder::default();
        assert!(plugin(bridge).execute(GET_DEVICE_INFO, &recorder));
        assert_eq!(
            recorder.errors.borrow().as_slice(),
            ["feature not available on this platform".to_owned()]
        );
    }

    #[test]
    fn missing_build_facts_still_classify() {
        let mut bridge = FakeBridge::pixel();
        bridge.snapshot = None;
        let info = plugin(bridge).device_info().unwrap();
        assert!(!info.is_virtual);
        assert_eq!(info.model, "");
    }

    #[test]
    fn amazon_devices_report_fire_os() {
        let mut bridge = FakeBridge::pixel();
        if let Some(snapshot) = bridge.snapshot.as_mut() {
            snapshot.manufacturer = "Amazon".into();
        }
        assert_eq!(plugin(bridge).device_info().unwrap().platform, "amazon-fireos");
        assert_eq!(resolve_platform("Android", "amazon"), "Android");
    }

    #[test]
    fn gsf_id_absent_provider_versus_failure() {
        let mut bridge = FakeBridge::pixel();
        bridge.gsf = None;
        let recorder = Recorder::default();
        assert!(plugin(bridge).execute(GET_DEVICE_INFO, &recorder));
        assert_eq!(recorder.successes.borrow()[0]["gsfId"], "");

        let mut bridge = FakeBridge::pixel();
        bridge.gsf_readable = false;
        let recorder = Recorder::default();
        assert!(plugin(bridge).execute(GET_DEVICE_INFO, &recorder));
        assert!(recorder.successes.borrow()[0]["gsfId"].is_null());

        let mut bridge = FakeBridge::pixel();
        bridge.gsf = Some("not-a-number".into());
        assert_eq!(plugin(bridge).device_info().unwrap().gsf_id, None);
    }

    #[test]
    fn gsf_cursor_shape() {
        assert!(gsf_row_usable(true, 2));
        assert!(gsf_row_usable(true, 3));
        assert!(!gsf_row_usable(true, 1));
        assert!(!gsf_row_usable(false, 2));
    }

    #[test]
    fn gsf_id_normalisation() {
        assert_eq!(normalize_gsf_id("255").as_deref(), Some("FF"));
        assert_eq!(normalize_gsf_id(" 3974589237465091234\n").as_deref(), Some("372893DA6B328CA2"));
        assert_eq!(normalize_gsf_id("-1").as_deref(), Some("FFFFFFFFFFFFFFFF"));
        assert_eq!(normalize_gsf_id(""), None);
        assert_eq!(normalize_gsf_id("android_id"), None);
    }

    #[test]
    fn serial_source_by_api_level() {
        assert_eq!(serial_source(21), SerialSource::BuildField);
        assert_eq!(serial_source(25), SerialSource::BuildField);
        assert_eq!(serial_source(26), SerialSource::PrivilegedGetter);
        assert_eq!(serial_source(28), SerialSource::PrivilegedGetter);
        assert_eq!(serial_source(29), SerialSource::Unavailable);
    }

    #[test]
    fn uuid_is_captured_at_construction() {
        let plugin = plugin(FakeBridge::pixel());
        assert_eq!(plugin.uuid(), Some("9774d56d682e549c"));
        assert_eq!(plugin.bridge().time_zone_id().unwrap(), "Europe/Berlin");
    }
}
