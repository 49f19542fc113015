use std::process::Command;

/// Exposes the short commit hash as `GIT_HASH`, reported by `GET /`.
/// Builds outside a checkout can pass it in through `SHOWS_GIT_HASH`.
fn main() {
    println!("cargo:rerun-if-env-changed=SHOWS_GIT_HASH");

    let git_hash = std::env::var("SHOWS_GIT_HASH")
        .ok()
        .filter(|h| !h.is_empty())
        .or_else(|| {
            Command::new("git")
                .args(["rev-parse", "--short", "HEAD"])
                .output()
                .ok()
                .filter(|o| o.status.success())
                .and_then(|o| String::from_utf8(o.stdout).ok())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
