//! Stamps the binary with the commit, build time and cargo profile
//! reported by `/health` and the startup log.

use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn commit() -> String {
    let output = match Command::new("git").args(["rev-parse", "--short=8", "HEAD"]).output() {
        Ok(output) if output.status.success() => output,
        _ => return UNKNOWN.to_string(),
    };
    match String::from_utf8(output.stdout) {
        Ok(hash) if !hash.trim().is_empty() => hash.trim().to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn built_at() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn stamp(key: &str, value: &str) {
    println!("cargo:rustc-env=PODIUM_{}={}", key, value);
}

fn main() {
    stamp("COMMIT", &commit());
    stamp("BUILT_AT", &built_at());
    stamp("PROFILE", &env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string()));

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
