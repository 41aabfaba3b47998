// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Known emulator fingerprints.
//
// Everything here is data: updating the signature set means editing these
// tables, not the matchers. Comparisons are case-sensitive unless a rule
// uses `Pattern::ContainsIgnoreCase`.

use std::net::Ipv4Addr;

use devprobe_core::{BuildField, EnvironmentSnapshot, MarkerCategory};

/// How a single build field is compared against a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Equals(&'static str),
    OneOf(&'static [&'static str]),
    Contains(&'static str),
    ContainsAny(&'static [&'static str]),
    StartsWith(&'static str),
    /// The needle must be lowercase; the field value is lowercased before comparing.
    ContainsIgnoreCase(&'static str),
}

impl Pattern {
    pub fn matches(&self, value: &str) -> bool {
        match *self {
            Self::Equals(expected) => value == expected,
            Self::OneOf(set) => set.iter().any(|s| *s == value),
            Self::Contains(needle) => value.contains(needle),
            Self::ContainsAny(needles) => needles.iter().any(|n| value.contains(n)),
            Self::StartsWith(prefix) => value.starts_with(prefix),
            Self::ContainsIgnoreCase(needle) => value.to_lowercase().contains(needle),
        }
    }
}

/// One `(field, pattern)` test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub field: BuildField,
    pub pattern: Pattern,
}

impl Condition {
    pub fn matches(&self, snapshot: &EnvironmentSnapshot) -> bool {
        self.pattern.matches(snapshot.field(self.field))
    }
}

/// A named conjunction of conditions. Fires when every condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub name: &'static str,
    pub conditions: &'static [Condition],
}

impl Rule {
    pub fn matches(&self, snapshot: &EnvironmentSnapshot) -> bool {
        !self.conditions.is_empty() && self.conditions.iter().all(|c| c.matches(snapshot))
    }

    /// Field of the first condition, reported in diagnostics.
    pub fn primary_field(&self) -> Option<BuildField> {
        self.conditions.first().map(|c| c.field)
    }
}

/// Files whose existence betrays a particular emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSet {
    pub category: MarkerCategory,
    pub paths: &'static [&'static str],
}

/// Versioned, immutable registry of every fingerprint the matchers know.
#[derive(Debug, Clone, Copy)]
pub struct SignatureDatabase {
    pub revision: u32,
    /// Rules for the direct-hit policy; any match is decisive.
    pub direct_rules: &'static [Rule],
    /// Rules that short-circuit the scored policy.
    pub strong_rules: &'static [Rule],
    /// Each matching condition adds one point under the scored policy.
    pub weak_signals: &'static [Condition],
    pub score_threshold: u32,
    pub marker_sets: &'static [MarkerSet],
    /// Files scanned for QEMU driver names.
    pub driver_files: &'static [&'static str],
    pub qemu_drivers: &'static [&'static str],
    /// Upper bound on bytes read from each driver file.
    pub driver_read_limit: usize,
    /// Default NAT address handed out by the SDK emulator.
    pub emulator_address: Ipv4Addr,
}

impl SignatureDatabase {
    /// The built-in signature set.
    pub fn current() -> &'static SignatureDatabase {
        &SIGNATURES
    }
}

macro_rules! rule {
    ($name:literal, $($field:ident => $pattern:expr),+ $(,)?) => {
        Rule {
            name: $name,
            conditions: &[$(Condition { field: BuildField::$field, pattern: $pattern }),+],
        }
    };
}

// -- Build-string rules -------------------------------------------------------

const FINGERPRINT_GENERIC: Rule =
    rule!("fingerprint-generic", Fingerprint => Pattern::StartsWith("generic"));
const MODEL_GOOGLE_SDK: Rule = rule!("model-google-sdk", Model => Pattern::Contains("google_sdk"));
const MODEL_DROID4X: Rule =
    rule!("model-droid4x", Model => Pattern::ContainsIgnoreCase("droid4x"));
const MODEL_EMULATOR: Rule = rule!("model-emulator", Model => Pattern::Contains("Emulator"));
const MODEL_SDK_X86: Rule =
    rule!("model-sdk-x86", Model => Pattern::Contains("Android SDK built for x86"));
const MODEL_ITOOLS: Rule = rule!("model-itools", Model => Pattern::StartsWith("iToolsAVM"));
const MANUFACTURER_GENYMOTION: Rule =
    rule!("manufacturer-genymotion", Manufacturer => Pattern::Contains("Genymotion"));
const MANUFACTURER_ITOOLS: Rule =
    rule!("manufacturer-itools", Manufacturer => Pattern::StartsWith("iToolsAVM"));
const MANUFACTURER_UNKNOWN: Rule =
    rule!("manufacturer-unknown", Manufacturer => Pattern::Equals("unknown"));
const HARDWARE_EMULATOR: Rule = rule!(
    "hardware-emulator",
    Hardware => Pattern::OneOf(&["goldfish", "vbox86", "ranchu"]),
);
const HARDWARE_GOLDFISH_VBOX: Rule =
    rule!("hardware-goldfish-vbox", Hardware => Pattern::OneOf(&["goldfish", "vbox86"]));
const HARDWARE_NOX: Rule = rule!("hardware-nox", Hardware => Pattern::ContainsIgnoreCase("nox"));
const PRODUCT_SDK: Rule = rule!(
    "product-sdk",
    Product => Pattern::OneOf(&["sdk", "google_sdk", "sdk_x86", "vbox86p"]),
);
const PRODUCT_NOX: Rule = rule!("product-nox", Product => Pattern::ContainsIgnoreCase("nox"));
const BOARD_NOX: Rule = rule!("board-nox", Board => Pattern::ContainsIgnoreCase("nox"));
const BOOTLOADER_NOX: Rule =
    rule!("bootloader-nox", Bootloader => Pattern::ContainsIgnoreCase("nox"));
const SERIAL_NOX: Rule = rule!("serial-nox", Serial => Pattern::ContainsIgnoreCase("nox"));
const HOST_DROID4X: Rule =
    rule!("host-droid4x", Host => Pattern::Contains("Droid4x-BuildStation"));
const DEVICE_ITOOLS: Rule = rule!("device-itools", Device => Pattern::StartsWith("iToolsAVM"));
const GENERIC_BRAND_AND_DEVICE: Rule = rule!(
    "generic-brand-and-device",
    Brand => Pattern::StartsWith("generic"),
    Device => Pattern::StartsWith("generic"),
);

// -- Marker files --------------------------------------------------------------

const GENYMOTION_FILES: MarkerSet = MarkerSet {
    category: MarkerCategory::Genymotion,
    paths: &["/dev/socket/genyd", "/dev/socket/baseband_genyd"],
};

const ANDY_FILES: MarkerSet = MarkerSet {
    category: MarkerCategory::Andy,
    paths: &["/fstab.andy", "/ueventd.andy.rc"],
};

const NOX_FILES: MarkerSet = MarkerSet {
    category: MarkerCategory::Nox,
    paths: &["/fstab.nox", "/init.nox.rc", "/ueventd.nox.rc"],
};

const X86_FILES: MarkerSet = MarkerSet {
    category: MarkerCategory::X86,
    paths: &[
        "/ueventd.android_x86.rc",
        "/x86.prop",
        "/ueventd.ttVM_x86.rc",
        "/init.ttVM_x86.rc",
        "/fstab.ttVM_x86",
        "/fstab.vbox86",
        "/init.vbox86.rc",
        "/ueventd.vbox86.rc",
    ],
};

const QEMU_PIPES: MarkerSet = MarkerSet {
    category: MarkerCategory::QemuPipes,
    paths: &["/dev/socket/qemud", "/dev/qemu_pipe"],
};

/// Built-in signature database, revision 3.
pub static SIGNATURES: SignatureDatabase = SignatureDatabase {
    revision: 3,
    direct_rules: &[
        FINGERPRINT_GENERIC,
        MODEL_GOOGLE_SDK,
        MODEL_DROID4X,
        MODEL_EMULATOR,
        MODEL_SDK_X86,
        MODEL_ITOOLS,
        MANUFACTURER_GENYMOTION,
        MANUFACTURER_ITOOLS,
        MANUFACTURER_UNKNOWN,
        HARDWARE_EMULATOR,
        HARDWARE_NOX,
        PRODUCT_SDK,
        PRODUCT_NOX,
        BOARD_NOX,
        BOOTLOADER_NOX,
        SERIAL_NOX,
        HOST_DROID4X,
        DEVICE_ITOOLS,
        GENERIC_BRAND_AND_DEVICE,
    ],
    strong_rules: &[
        MANUFACTURER_GENYMOTION,
        HARDWARE_GOLDFISH_VBOX,
        MODEL_EMULATOR,
        MODEL_DROID4X,
        HARDWARE_NOX,
        PRODUCT_NOX,
        BOARD_NOX,
        BOOTLOADER_NOX,
        SERIAL_NOX,
        HOST_DROID4X,
        MODEL_ITOOLS,
        MANUFACTURER_ITOOLS,
        DEVICE_ITOOLS,
    ],
    weak_signals: &[
        Condition {
            field: BuildField::Product,
            pattern: Pattern::OneOf(&[
                "sdk",
                "google_sdk",
                "sdk_x86",
                "vbox86p",
                "sdk_gphone_x86",
                "sdk_gphone_x86_64",
                "sdk_gphone64_x86_64",
                "sdk_gphone64_arm64",
            ]),
        },
        Condition {
            field: BuildField::Manufacturer,
            pattern: Pattern::Equals("unknown"),
        },
        Condition {
            field: BuildField::Brand,
            pattern: Pattern::OneOf(&["generic", "generic_x86", "generic_x86_64", "generic_arm64"]),
        },
        Condition {
            field: BuildField::Device,
            pattern: Pattern::OneOf(&[
                "generic",
                "generic_x86",
                "generic_x86_64",
                "generic_arm64",
                "vbox86p",
            ]),
        },
        Condition {
            field: BuildField::Model,
            pattern: Pattern::OneOf(&[
                "Android SDK built for x86",
                "Android SDK built for x86_64",
                "Android SDK built for arm64",
            ]),
        },
        Condition {
            field: BuildField::Hardware,
            pattern: Pattern::Equals("ranchu"),
        },
        Condition {
            field: BuildField::Fingerprint,
            pattern: Pattern::ContainsAny(&[
                "generic/sdk/generic",
                "generic_x86/sdk_x86/generic_x86",
                "generic/google_sdk/generic",
                "generic/vbox86p/vbox86p",
                "sdk_gphone_x86",
                "sdk_gphone64_arm64",
            ]),
        },
    ],
    score_threshold: 2,
    marker_sets: &[GENYMOTION_FILES, ANDY_FILES, NOX_FILES, X86_FILES, QEMU_PIPES],
    driver_files: &["/proc/tty/drivers", "/proc/cpuinfo"],
    qemu_drivers: &["goldfish"],
    driver_read_limit: 1024,
    emulator_address: Ipv4Addr::new(10, 0, 2, 15),
};
