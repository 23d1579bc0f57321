/// Build script for expvar
/// Embeds version metadata shown by `expvar version`

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");

    // short hash; absent outside a git checkout
    if let Ok(output) = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            if let Ok(hash) = String::from_utf8(output.stdout) {
                println!("cargo:rustc-env=EXPVAR_GIT_HASH={}", hash.trim());
            }
        }
    }
}
