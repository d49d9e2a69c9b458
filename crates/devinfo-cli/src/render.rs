use std::fmt::Write;

use devinfo_core::{AttributeKey, AttributeSnapshot, CollectionReport};

/// Line order of the DeviceInfo view.
const DISPLAY_ORDER: [AttributeKey; 11] = [
    AttributeKey::PackageName,
    AttributeKey::AppVersion,
    AttributeKey::AdTrackingStatus,
    AttributeKey::Gaid,
    AttributeKey::AppSetId,
    AttributeKey::AndroidId,
    AttributeKey::Locale,
    AttributeKey::DeviceMake,
    AttributeKey::DeviceModel,
    AttributeKey::BuildVersion,
    AttributeKey::OsVersion,
];

const PURPOSE: [&str; 3] = [
    "Shows the device data points a server needs to send server-to-server \
     analytics events on behalf of an Android app.",
    "Collect them client-side, send them to your server and keep them in the \
     device graph for the user, so out-of-app events can carry them later.",
    "Every data point is also written to the log for debugging.",
];

pub(crate) fn render_snapshot(snapshot: &AttributeSnapshot) -> String {
    let mut out = String::from("DeviceInfo\n\n");
    for key in DISPLAY_ORDER {
        let _ = writeln!(out, "{}: {}", key.label(), snapshot.get(key));
    }
    out
}

pub(crate) fn render_fallbacks(report: &CollectionReport) -> String {
    let mut out = String::new();
    for (key, cause) in report.fallbacks() {
        let _ = writeln!(out, "{key}: {}", cause.reason());
    }
    if out.is_empty() {
        out.push_str("all attributes resolved\n");
    }
    let _ = writeln!(out, "collected in {}ms", report.elapsed().as_millis());
    out
}

pub(crate) fn render_about() -> String {
    let mut out = String::from("About\n\n");
    let _ = writeln!(out, "Version: {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(
        out,
        "Platform: {}-{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    out.push_str("\nPurpose\n\n");
    for paragraph in PURPOSE {
        let _ = writeln!(out, "{paragraph}");
    }
    out
}
