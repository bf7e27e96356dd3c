use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

use crate::config::AppConfig;

/// Run all boot checks. Call this before Rocket launches.
/// Creates the database and storage directories and aborts if they cannot
/// be created.
pub fn run(config: &AppConfig) {
    info!("Kora boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Directories ─────────────────────────────────
    let mut dirs: Vec<String> = Vec::new();
    if let Some(parent) = Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            dirs.push(parent.to_string_lossy().into_owned());
        }
    }
    dirs.push(config.storage.root.clone());
    for bucket in &config.storage.buckets {
        dirs.push(format!("{}/{}", config.storage.root, bucket.name));
    }

    for dir in &dirs {
        let path = Path::new(dir);
        if !path.exists() {
            match fs::create_dir_all(path) {
                Ok(_) => info!("  Created directory: {}", dir),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir, e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Secrets ─────────────────────────────────────
    if config.functions.service_secret.is_empty() {
        warn!("  functions.service_secret is empty: scheduled function calls will be rejected");
        warnings += 1;
    }
    if config.storage.signing_key.is_empty() {
        warn!("  storage.signing_key is empty: private bucket objects cannot be served");
        warnings += 1;
    }
    if config.server.dev_mode {
        warn!("  server.dev_mode is on: error details are included in responses");
        warnings += 1;
    }

    // ── 3. Storage root writable ───────────────────────
    let storage_root = Path::new(&config.storage.root);
    if storage_root.exists() {
        let test_file = storage_root.join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                warn!("  Storage root not writable: {} (uploads will fail)", e);
                warnings += 1;
            }
        }
    }

    // ── Summary ────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check failed with {} error(s) and {} warning(s). Aborting.",
            errors, warnings
        );
        process::exit(1);
    }
    if warnings > 0 {
        info!("Boot check passed with {} warning(s).", warnings);
    } else {
        info!("Boot check passed.");
    }
}
