//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable verifying `nbtrack_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("nbtrack_core ping={}", nbtrack_core::ping());
    println!("nbtrack_core version={}", nbtrack_core::core_version());
    for (key, value) in nbtrack_core::environment_metadata() {
        println!("nbtrack_core meta.{key}={value}");
    }
}
