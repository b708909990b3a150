//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `clustershare_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!(
        "clustershare_core version={}",
        clustershare_core::core_version()
    );
}
