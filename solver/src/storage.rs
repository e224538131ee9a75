//! Binary I/O for the expected-value table.
//!
//! Two layouts, both in [upper_sum][used_mask] row-major order:
//!
//! - **Headered**: 16-byte header (magic "YCHT", version, rows, cols) followed by
//!   262,144 f64 LE values. Lossless. 2,097,168 bytes.
//! - **Raw f32**: 262,144 f32 LE values with no header. 1,048,576 bytes, suitable
//!   for embedding with `include_bytes!` and indexing `(upper_sum * 4096 + mask) * 4`.
//!
//! Loading uses zero-copy memory mapping via `memmap2`. A JSON manifest written
//! next to the table records how it was produced.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::constants::*;
use crate::types::{ExpectedValueTable, RerollRule, StateValues, ValueWidth};

const HEADER_BYTES: usize = 16;

/// On-disk layout of a table file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableFormat {
    Headered,
    RawF32,
}

impl TableFormat {
    /// Exact file size in bytes.
    pub fn file_size(self) -> usize {
        match self {
            TableFormat::Headered => HEADER_BYTES + NUM_STATES * ValueWidth::F64.bytes(),
            TableFormat::RawF32 => NUM_STATES * ValueWidth::F32.bytes(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: size {actual} bytes matches no table format")]
    SizeMismatch { path: PathBuf, actual: u64 },
    #[error("{path}: invalid header (magic=0x{magic:08x} version={version})")]
    InvalidHeader {
        path: PathBuf,
        magic: u32,
        version: u32,
    },
    #[error("{path}: table is {rows}x{cols}, expected 64x4096")]
    DimensionMismatch { path: PathBuf, rows: u32, cols: u32 },
    #[error("manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Description of a saved table, written as `<table>.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableManifest {
    pub format: TableFormat,
    pub rows: usize,
    pub cols: usize,
    pub reroll_rule: RerollRule,
    pub initial_value: f64,
    pub solve_seconds: f64,
}

/// Path of the manifest that accompanies `table_path`.
pub fn manifest_path(table_path: &Path) -> PathBuf {
    let mut name = table_path.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Check if a file exists on disk.
pub fn file_exists(path: &Path) -> bool {
    path.exists()
}

/// Write every cell of `table` to `path` in the given layout.
pub fn save_table(
    table: &ExpectedValueTable,
    path: &Path,
    format: TableFormat,
) -> Result<(), StorageError> {
    let start_time = Instant::now();
    info!("Saving table to {} ({:?})...", path.display(), format);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
    }

    let file = File::create(path).map_err(io_error(path))?;
    let mut w = BufWriter::new(file);

    match format {
        TableFormat::Headered => {
            let header = [
                TABLE_FILE_MAGIC,
                TABLE_FILE_VERSION,
                UPPER_SUM_MAX as u32,
                USED_MASK_MAX as u32,
            ];
            for field in header {
                w.write_all(&field.to_le_bytes()).map_err(io_error(path))?;
            }
            for v in table.iter() {
                w.write_all(&v.to_le_bytes()).map_err(io_error(path))?;
            }
        }
        TableFormat::RawF32 => {
            for v in table.iter() {
                w.write_all(&(v as f32).to_le_bytes()).map_err(io_error(path))?;
            }
        }
    }
    w.flush().map_err(io_error(path))?;

    info!(
        "Saved {} states in {:.2} ms",
        NUM_STATES,
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

/// Memory-map a table written by [`save_table`]. The layout is detected from the file size.
pub fn load_table(path: &Path) -> Result<ExpectedValueTable, StorageError> {
    let start_time = Instant::now();
    info!("Loading table from {}...", path.display());

    let file = File::open(path).map_err(io_error(path))?;
    let len = file.metadata().map_err(io_error(path))?.len();

    let format = if len as usize == TableFormat::Headered.file_size() {
        TableFormat::Headered
    } else if len as usize == TableFormat::RawF32.file_size() {
        TableFormat::RawF32
    } else {
        return Err(StorageError::SizeMismatch {
            path: path.to_path_buf(),
            actual: len,
        });
    };

    // SAFETY: the file is opened read-only and not modified while mapped.
    let mmap = unsafe { Mmap::map(&file) }.map_err(io_error(path))?;

    let values = match format {
        TableFormat::Headered => {
            let field = |i: usize| {
                let mut b = [0u8; 4];
                b.copy_from_slice(&mmap[i * 4..i * 4 + 4]);
                u32::from_le_bytes(b)
            };
            let (magic, version, rows, cols) = (field(0), field(1), field(2), field(3));
            if magic != TABLE_FILE_MAGIC || version != TABLE_FILE_VERSION {
                return Err(StorageError::InvalidHeader {
                    path: path.to_path_buf(),
                    magic,
                    version,
                });
            }
            if rows as usize != UPPER_SUM_MAX || cols as usize != USED_MASK_MAX {
                return Err(StorageError::DimensionMismatch {
                    path: path.to_path_buf(),
                    rows,
                    cols,
                });
            }
            StateValues::Mmap {
                mmap,
                offset: HEADER_BYTES,
                width: ValueWidth::F64,
            }
        }
        TableFormat::RawF32 => StateValues::Mmap {
            mmap,
            offset: 0,
            width: ValueWidth::F32,
        },
    };

    info!(
        "Loaded {} states ({:?}) via zero-copy mmap in {:.2} ms",
        NUM_STATES,
        format,
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(ExpectedValueTable::from_values(values))
}

/// Write `manifest` as pretty JSON next to `table_path`.
pub fn save_manifest(table_path: &Path, manifest: &TableManifest) -> Result<(), StorageError> {
    let path = manifest_path(table_path);
    let json = serde_json::to_string_pretty(manifest).map_err(|source| StorageError::Manifest {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json).map_err(io_error(&path))
}

/// Read the manifest stored next to `table_path`.
pub fn load_manifest(table_path: &Path) -> Result<TableManifest, StorageError> {
    let path = manifest_path(table_path);
    let content = fs::read_to_string(&path).map_err(io_error(&path))?;
    serde_json::from_str(&content).map_err(|source| StorageError::Manifest { path, source })
}
