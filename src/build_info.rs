//! Commit and date baked in by `build.rs`.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// `wayfarer <version> (<date>, <commit>)`
pub fn version_line() -> String {
    format!(
        "wayfarer {} ({}, {})",
        env!("CARGO_PKG_VERSION"),
        BUILD_DATE,
        BUILD_COMMIT
    )
}
