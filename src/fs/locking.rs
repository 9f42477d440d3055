//! Advisory-locked access to the catalog file
//!
//! Readers take a shared `fs2` lock; writers hold an exclusive lock across
//! the whole read-modify-write so two CLI invocations cannot interleave
//! their updates. Advisory locks are cooperative: every participant must
//! go through these functions.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Read file contents with a shared (read) lock.
pub fn locked_read(path: &Path) -> Result<String> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    file.lock_shared()
        .with_context(|| format!("Failed to acquire shared lock: {}", path.display()))?;
    let mut content = String::new();
    BufReader::new(&file)
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(content)
}

/// Rewrite a file under one exclusive lock.
///
/// `update` receives the current contents (empty for a new file) and
/// returns the new contents plus a value handed back to the caller. When
/// `update` fails the file is left untouched.
///
/// The sequence is: open → lock → read → update → truncate → write → flush.
pub fn locked_update<T>(
    path: &Path,
    update: impl FnOnce(&str) -> Result<(String, T)>,
) -> Result<T> {
    #[allow(clippy::suspicious_open_options)]
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open file for writing: {}", path.display()))?;
    file.lock_exclusive()
        .with_context(|| format!("Failed to acquire exclusive lock: {}", path.display()))?;

    let mut current = String::new();
    file.read_to_string(&mut current)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let (content, value) = update(&current)?;

    // Truncate only after the update succeeded and while the lock is held
    file.set_len(0)
        .with_context(|| format!("Failed to truncate file: {}", path.display()))?;
    file.seek(SeekFrom::Start(0))
        .with_context(|| format!("Failed to rewind file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("Failed to flush file: {}", path.display()))?;

    Ok(value)
}
