//! Embeds the build version as `FINTRACK_VERSION`.
//!
//! Tagged builds report the tag (`1.4.0`), untagged builds report the package
//! version plus the short commit (`0.1.0+a1b2c3d`), and builds outside git
//! report the package version.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=FINTRACK_VERSION_OVERRIDE");

    let package = env!("CARGO_PKG_VERSION");
    let version = std::env::var("FINTRACK_VERSION_OVERRIDE")
        .ok()
        .or_else(exact_tag)
        .or_else(|| short_commit().map(|commit| format!("{package}+{commit}")))
        .unwrap_or_else(|| package.to_string());

    println!("cargo:rustc-env=FINTRACK_VERSION={version}");
}

fn exact_tag() -> Option<String> {
    let tag = git(&["describe", "--tags", "--exact-match"])?;
    Some(tag.strip_prefix('v').unwrap_or(&tag).to_string())
}

fn short_commit() -> Option<String> {
    git(&["rev-parse", "--short", "HEAD"])
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }

    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
