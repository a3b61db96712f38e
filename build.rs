//! Build script for the portfolio backend server.
//!
//! Copies the configuration template to the user's local data directory so a
//! ready-to-edit example sits next to the `.env` file the server loads at
//! startup.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root into the local data directory.
///
/// # File Operations
///
/// ## Source Location
/// The script looks for `.env.example` in the crate root directory (where
/// Cargo.toml resides).
///
/// ## Destination Location
/// The template is copied to the platform-specific local data directory:
/// - Linux: `~/.local/share/foliosrv/.env.example`
/// - macOS: `~/Library/Application Support/foliosrv/.env.example`
/// - Windows: `%LOCALAPPDATA%/foliosrv/.env.example`
///
/// # Error Handling Strategy
///
/// A missing template produces a cargo warning instead of failing the build;
/// directory creation and copy failures are critical and abort it.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Re-run if the template changes
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("foliosrv");
    fs::create_dir_all(&out_dir)?;

    if env_example_path.is_file() {
        let contents = fs::read_to_string(&env_example_path)?;
        fs::write(out_dir.join(".env.example"), contents)?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
    }

    Ok(())
}
