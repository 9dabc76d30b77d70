//! JNI bindings for the Android app.
//!
//! Each public function here corresponds to an `external fun` declaration
//! in RustBridge.kt. The function names follow JNI naming conventions:
//! Java_<package>_<class>_<method> with dots replaced by underscores.
//! Stateless helpers only; the live session runs on the tokio driver and
//! talks to Kotlin over its own channel bridge.

use jni::objects::{JClass, JString};
use jni::sys::{jdouble, jint, jstring};
use jni::JNIEnv;

use crate::deeplink::{external_map_url, Platform};
use crate::guidance;
use crate::model::{Guide, Point};

/// Initialize android logging for the `log` facade. Call once from
/// Application.onCreate().
/// Maps to: RustBridge.initLogging()
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_waytrack_app_RustBridge_initLogging(
    _env: JNIEnv,
    _class: JClass,
) {
    android_logger::init_once(
        android_logger::Config::default().with_max_level(log::LevelFilter::Debug),
    );
}

/// Returns the waytrack library version.
/// Maps to: RustBridge.version() -> String
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_waytrack_app_RustBridge_version(
    env: JNIEnv,
    _class: JClass,
) -> jstring {
    let version = crate::VERSION;
    env.new_string(version)
        .expect("failed to create Java string")
        .into_raw()
}

/// Build the deep link that opens the native maps app for a destination.
/// Maps to: RustBridge.externalMapUrl(lat, lon) -> String
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_waytrack_app_RustBridge_externalMapUrl(
    env: JNIEnv,
    _class: JClass,
    lat: jdouble,
    lon: jdouble,
) -> jstring {
    let url = external_map_url(&Point { lat, lon }, Platform::Android);
    env.new_string(url)
        .expect("failed to create Java string")
        .into_raw()
}

/// Recompute the active guide step for a position, given the guide as
/// JSON. Returns -1 for an empty or unparseable guide.
/// Maps to: RustBridge.activeStep(lat, lon, guideJson) -> Int
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_waytrack_app_RustBridge_activeStep(
    mut env: JNIEnv,
    _class: JClass,
    lat: jdouble,
    lon: jdouble,
    guide_json: JString,
) -> jint {
    let Ok(json) = env.get_string(&guide_json) else {
        return -1;
    };
    let Ok(guide) = serde_json::from_str::<Guide>(&String::from(json)) else {
        return -1;
    };

    match guidance::active_step(&Point { lat, lon }, &guide) {
        Some(index) => index as jint,
        None => -1,
    }
}
