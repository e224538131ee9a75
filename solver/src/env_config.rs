//! Environment configuration shared by the Yacht binaries.
//!
//! Reads `YACHT_BASE_PATH` and `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`).

use std::path::PathBuf;

use tracing::info;

/// Default rayon pool size when no environment variable is set.
pub const DEFAULT_THREADS: usize = 8;

/// Read `YACHT_BASE_PATH` (default `"."`) and chdir into it.
pub fn init_base_path() -> std::io::Result<PathBuf> {
    let base_path = std::env::var("YACHT_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    info!("YACHT_BASE_PATH={}", base_path);
    std::env::set_current_dir(&base_path)?;
    let cwd = std::env::current_dir()?;
    info!("Working directory: {}", cwd.display());
    Ok(cwd)
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8).
pub fn threads_from_env() -> usize {
    parse_threads(
        std::env::var("RAYON_NUM_THREADS")
            .or_else(|_| std::env::var("OMP_NUM_THREADS"))
            .ok()
            .as_deref(),
    )
}

fn parse_threads(value: Option<&str>) -> usize {
    value
        .and_then(|s| s.trim().parse().ok())
        .filter(|&n: &usize| n > 0)
        .unwrap_or(DEFAULT_THREADS)
}

/// Build the rayon global thread pool with `num_threads` workers.
pub fn init_rayon_threads(num_threads: usize) -> Result<usize, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;
    info!("Rayon threads: {}", num_threads);
    Ok(num_threads)
}
