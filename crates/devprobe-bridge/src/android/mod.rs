// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android`,
// `armv7-linux-androideabi` or `x86_64-linux-android`. Build facts are read
// from the static fields of `android.os.Build`; identifiers come from the
// hosting Activity's ContentResolver. Marker files and network interfaces
// are read natively, without going through the JVM.

#![cfg(target_os = "android")]

use std::net::IpAddr;
use std::path::Path;
use std::sync::OnceLock;

use jni::{JNIEnv, JavaVM};
use jni::objects::{JObject, JString, JValue};

use devprobe_core::error::{DevprobeError, Result};
use devprobe_core::{BuildField, EnvironmentSnapshot, ProbeError};
use devprobe_detect::probe::host_interface_addresses;
use devprobe_detect::{FilesystemProbe, HostProbe, NetworkProbe};

use crate::device_info::{SerialSource, gsf_row_usable, serial_source};
use crate::traits::*;

const BUILD: &str = "android/os/Build";
const BUILD_VERSION: &str = "android/os/Build$VERSION";
const SETTINGS_SECURE: &str = "android/provider/Settings$Secure";
const STRING_SIG: &str = "Ljava/lang/String;";

const ANDROID_ID: &str = "android_id";
const GSERVICES_URI: &str = "content://com.google.android.gsf.gservices";
const INTERNET_PERMISSION: &str = "android.permission.INTERNET";
const PERMISSION_GRANTED: i32 = 0;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

/// The process-wide `JavaVM`, resolved from the NDK context on first use.
fn java_vm() -> Result<&'static JavaVM> {
    if let Some(vm) = JAVA_VM.get() {
        return Ok(vm);
    }
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| DevprobeError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    Ok(JAVA_VM.get_or_init(|| vm))
}

/// Obtain a [`JNIEnv`] handle for the current thread.
///
/// The thread stays attached to the VM for the rest of its lifetime.
fn jni_env() -> Result<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| DevprobeError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// Obtain the hosting `Activity` as a [`JObject`].
fn activity() -> Result<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(DevprobeError::Bridge(
            "Android context is null, native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Map any `jni::errors::Error` into `DevprobeError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> DevprobeError {
    DevprobeError::Bridge(format!("{context}: {e}"))
}

/// Drop a pending Java exception so later JNI calls on this thread work.
fn clear_exception(env: &mut JNIEnv<'_>) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the device-info bridge.
///
/// The struct holds no JVM state; the first JNI call happens lazily when a
/// trait method is invoked.
#[derive(Debug, Default)]
pub struct AndroidBridge {
    host: HostProbe,
}

impl AndroidBridge {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// NativeBuildInfo (android.os.Build)
// ---------------------------------------------------------------------------

impl NativeBuildInfo for AndroidBridge {
    fn environment_snapshot(&self) -> Result<EnvironmentSnapshot> {
        let mut env = jni_env()?;
        let mut snapshot = EnvironmentSnapshot::default();
        for field in BuildField::ALL {
            let value = static_string(&mut env, BUILD, build_field_name(field))?;
            snapshot.set_field(field, value.unwrap_or_default());
        }
        tracing::debug!(model = %snapshot.model, "Android: build facts read");
        Ok(snapshot)
    }

    fn os_version(&self) -> Result<String> {
        let mut env = jni_env()?;
        Ok(static_string(&mut env, BUILD_VERSION, "RELEASE")?.unwrap_or_default())
    }

    fn sdk_version(&self) -> Result<u32> {
        let mut env = jni_env()?;
        let sdk = env
            .get_static_field(BUILD_VERSION, "SDK_INT", "I")
            .map_err(|e| jni_err("Build.VERSION.SDK_INT", e))?
            .i()
            .map_err(|e| jni_err("SDK_INT->i", e))?;
        Ok(u32::try_from(sdk).unwrap_or(0))
    }

    /// Serial number as far as the API level allows.
    ///
    /// API 26..=28 needs READ_PHONE_STATE; without it `Build.getSerial()`
    /// throws a SecurityException, which is cleared and reported as an
    /// error.
    fn serial_number(&self) -> Result<String> {
        match serial_source(self.sdk_version()?) {
            SerialSource::BuildField => {
                let mut env = jni_env()?;
                Ok(static_string(&mut env, BUILD, "SERIAL")?.unwrap_or_default())
            }
            SerialSource::PrivilegedGetter => {
                let mut env = jni_env()?;
                let serial = env
                    .call_static_method(BUILD, "getSerial", "()Ljava/lang/String;", &[])
                    .and_then(|v| v.l());
                match serial {
                    Ok(obj) => Ok(java_string(&mut env, obj)?.unwrap_or_default()),
                    Err(e) => {
                        clear_exception(&mut env);
                        Err(jni_err("Build.getSerial", e))
                    }
                }
            }
            SerialSource::Unavailable => Ok(String::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// NativeIdentity (Settings.Secure, GSF provider, Context)
// ---------------------------------------------------------------------------

impl NativeIdentity for AndroidBridge {
    /// `Settings.Secure.ANDROID_ID`.
    fn device_id(&self) -> Result<Option<String>> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let resolver = content_resolver(&mut env, &activity)?;

        let j_key: JString = env
            .new_string(ANDROID_ID)
            .map_err(|e| jni_err("new_string(android_id)", e))?;

        let id: JObject = env
            .call_static_method(
                SETTINGS_SECURE,
                "getString",
                "(Landroid/content/ContentResolver;Ljava/lang/String;)Ljava/lang/String;",
                &[JValue::Object(&resolver), JValue::Object(&j_key)],
            )
            .map_err(|e| jni_err("Settings.Secure.getString", e))?
            .l()
            .map_err(|e| jni_err("Settings.Secure.getString->l", e))?;

        java_string(&mut env, id)
    }

    /// Query the Google services provider for `android_id`.
    ///
    /// Returns `Ok(None)` when the provider is absent or has no usable row.
    fn raw_gsf_id(&self) -> Result<Option<String>> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let resolver = content_resolver(&mut env, &activity)?;

        let result = query_gservices(&mut env, &resolver);
        if result.is_err() {
            clear_exception(&mut env);
        }
        result
    }

    fn files_dir(&self) -> Result<String> {
        let mut env = jni_env()?;
        let activity = activity()?;

        let dir: JObject = env
            .call_method(&activity, "getFilesDir", "()Ljava/io/File;", &[])
            .map_err(|e| jni_err("getFilesDir", e))?
            .l()
            .map_err(|e| jni_err("getFilesDir->l", e))?;

        let path: JObject = env
            .call_method(&dir, "getPath", "()Ljava/lang/String;", &[])
            .map_err(|e| jni_err("File.getPath", e))?
            .l()
            .map_err(|e| jni_err("File.getPath->l", e))?;

        Ok(java_string(&mut env, path)?.unwrap_or_default())
    }

    fn time_zone_id(&self) -> Result<String> {
        let mut env = jni_env()?;

        let zone: JObject = env
            .call_static_method("java/util/TimeZone", "getDefault", "()Ljava/util/TimeZone;", &[])
            .map_err(|e| jni_err("TimeZone.getDefault", e))?
            .l()
            .map_err(|e| jni_err("TimeZone.getDefault->l", e))?;

        let id: JObject = env
            .call_method(&zone, "getID", "()Ljava/lang/String;", &[])
            .map_err(|e| jni_err("TimeZone.getID", e))?
            .l()
            .map_err(|e| jni_err("TimeZone.getID->l", e))?;

        Ok(java_string(&mut env, id)?.unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Probes
// ---------------------------------------------------------------------------

impl FilesystemProbe for AndroidBridge {
    fn exists(&self, path: &Path) -> bool {
        self.host.exists(path)
    }

    fn read_prefix(&self, path: &Path, max_bytes: usize) -> std::result::Result<Vec<u8>, ProbeError> {
        self.host.read_prefix(path, max_bytes)
    }
}

impl NetworkProbe for AndroidBridge {
    /// `checkCallingOrSelfPermission(INTERNET)`. Any JNI failure counts as
    /// not granted.
    fn permission_granted(&self) -> bool {
        match internet_permission() {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!(error = %e, "Android: permission check failed");
                false
            }
        }
    }

    fn interface_addresses(&self) -> std::result::Result<Vec<IpAddr>, ProbeError> {
        host_interface_addresses()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Name of the `android.os.Build` field backing a snapshot field.
fn build_field_name(field: BuildField) -> &'static str {
    match field {
        BuildField::Manufacturer => "MANUFACTURER",
        BuildField::Brand => "BRAND",
        BuildField::Device => "DEVICE",
        BuildField::Model => "MODEL",
        BuildField::Product => "PRODUCT",
        BuildField::Hardware => "HARDWARE",
        BuildField::Fingerprint => "FINGERPRINT",
        BuildField::Board => "BOARD",
        BuildField::Bootloader => "BOOTLOADER",
        BuildField::Serial => "SERIAL",
        BuildField::Host => "HOST",
    }
}

/// Read a static `String` field. `None` when the field holds null.
fn static_string(env: &mut JNIEnv<'_>, class: &str, field: &str) -> Result<Option<String>> {
    let value: JObject = env
        .get_static_field(class, field, STRING_SIG)
        .map_err(|e| jni_err(field, e))?
        .l()
        .map_err(|e| jni_err(field, e))?;
    java_string(env, value)
}

fn java_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> Result<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let value: String = env
        .get_string(&JString::from(obj))
        .map_err(|e| jni_err("get_string", e))?
        .into();
    Ok(Some(value))
}

fn content_resolver<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JObject<'a>> {
    env.call_method(
        activity,
        "getContentResolver",
        "()Landroid/content/ContentResolver;",
        &[],
    )
    .map_err(|e| jni_err("getContentResolver", e))?
    .l()
    .map_err(|e| jni_err("getContentResolver->l", e))
}

/// `resolver.query(gservices, null, null, {"android_id"}, null)`, then
/// column 1 of the first row.
fn query_gservices(env: &mut JNIEnv<'_>, resolver: &JObject<'_>) -> Result<Option<String>> {
    let j_uri_str: JString = env
        .new_string(GSERVICES_URI)
        .map_err(|e| jni_err("new_string(uri)", e))?;

    let uri: JObject = env
        .call_static_method(
            "android/net/Uri",
            "parse",
            "(Ljava/lang/String;)Landroid/net/Uri;",
            &[JValue::Object(&j_uri_str)],
        )
        .map_err(|e| jni_err("Uri.parse", e))?
        .l()
        .map_err(|e| jni_err("Uri.parse->l", e))?;

    let j_key: JString = env
        .new_string(ANDROID_ID)
        .map_err(|e| jni_err("new_string(android_id)", e))?;
    let selection_args = env
        .new_object_array(1, "java/lang/String", &j_key)
        .map_err(|e| jni_err("new_object_array", e))?;

    let null = JObject::null();
    let cursor: JObject = env
        .call_method(
            resolver,
            "query",
            "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;",
            &[
                JValue::Object(&uri),
                JValue::Object(&null),
                JValue::Object(&null),
                JValue::Object(&selection_args),
                JValue::Object(&null),
            ],
        )
        .map_err(|e| jni_err("ContentResolver.query", e))?
        .l()
        .map_err(|e| jni_err("ContentResolver.query->l", e))?;

    if cursor.is_null() {
        tracing::debug!("Android: GSF provider not present");
        return Ok(None);
    }

    let raw = read_gsf_row(env, &cursor);
    if raw.is_err() {
        clear_exception(env);
    }

    // Closed on every path; a pending exception would make this call fail.
    let closed = env
        .call_method(&cursor, "close", "()V", &[])
        .map_err(|e| jni_err("Cursor.close", e));

    let raw = raw?;
    closed?;
    Ok(raw)
}

/// Column 1 of the first row. `None` for an empty cursor or fewer than two
/// columns; a null value reads as `""`, which no id parses from.
fn read_gsf_row(env: &mut JNIEnv<'_>, cursor: &JObject<'_>) -> Result<Option<String>> {
    let has_row = env
        .call_method(cursor, "moveToFirst", "()Z", &[])
        .map_err(|e| jni_err("Cursor.moveToFirst", e))?
        .z()
        .map_err(|e| jni_err("moveToFirst->z", e))?;
    let columns = env
        .call_method(cursor, "getColumnCount", "()I", &[])
        .map_err(|e| jni_err("Cursor.getColumnCount", e))?
        .i()
        .map_err(|e| jni_err("getColumnCount->i", e))?;

    if !gsf_row_usable(has_row, columns) {
        return Ok(None);
    }

    let value: JObject = env
        .call_method(cursor, "getString", "(I)Ljava/lang/String;", &[JValue::Int(1)])
        .map_err(|e| jni_err("Cursor.getString", e))?
        .l()
        .map_err(|e| jni_err("Cursor.getString->l", e))?;
    Ok(Some(java_string(env, value)?.unwrap_or_default()))
}

fn internet_permission() -> Result<bool> {
    let mut env = jni_env()?;
    let activity = activity()?;

    let j_permission: JString = env
        .new_string(INTERNET_PERMISSION)
        .map_err(|e| jni_err("new_string(permission)", e))?;

    let status = env
        .call_method(
            &activity,
            "checkCallingOrSelfPermission",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&j_permission)],
        )
        .map_err(|e| jni_err("checkCallingOrSelfPermission", e))?
        .i()
        .map_err(|e| jni_err("checkCallingOrSelfPermission->i", e))?;

    Ok(status == PERMISSION_GRANTED)
}
