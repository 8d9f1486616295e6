//! JSON Lines file attack repository
//!
//! Appends one JSON object per line. Appends and reads are serialized
//! through a `RwLock<()>` so a reader never sees half a line written by
//! this process. A torn final line (a crash, an interrupted write) is
//! truncated when the repository is opened and again before each append,
//! and a failed append rolls the file back to its previous length.

use super::AttackRepository;
use crate::error::{AttackStoreError, Result};
use crate::types::Attack;
use async_trait::async_trait;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::RwLock;

/// Append-only JSON Lines repository
pub struct FileRepository {
    path: PathBuf,
    sync_writes: bool,
    lock: RwLock<()>,
}

impl FileRepository {
    /// Open (or create) the repository file at `path`
    ///
    /// With `sync_writes`, every save calls `sync_data` before returning.
    pub async fn open(path: impl Into<PathBuf>, sync_writes: bool) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AttackStoreError::storage(
                    "open",
                    format!("failed to create directory {}: {}", parent.display(), e),
                )
            })?;
        }

        let len = repair_torn_tail(&path).await?;

        tracing::info!(
            path = %path.display(),
            bytes = len,
            sync_writes,
            "Attack file repository opened"
        );

        Ok(Self {
            path,
            sync_writes,
            lock: RwLock::new(()),
        })
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AttackRepository for FileRepository {
    async fn save(&self, attack: &Attack) -> Result<()> {
        let mut line = serde_json::to_vec(attack)?;
        line.push(b'\n');

        let _guard = self.lock.write().await;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| write_error(&self.path, e))?;

        let start = line_aligned_len(&mut file, &self.path).await?;

        if let Err(e) = append_line(&mut file, &line, self.sync_writes).await {
            // Roll back whatever part of the line reached the file
            if let Err(rollback) = file.set_len(start).await {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "Failed to roll back partial append"
                );
            }
            return Err(write_error(&self.path, e));
        }

        tracing::debug!(
            attack_id = %attack.id,
            path = %self.path.display(),
            bytes = line.len(),
            "Attack appended"
        );
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Attack>> {
        let content = {
            let _guard = self.lock.read().await;
            match tokio::fs::read_to_string(&self.path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => {
                    return Err(AttackStoreError::storage(
                        "load",
                        format!("failed to read {}: {}", self.path.display(), e),
                    ))
                }
            }
        };

        let attacks = parse_lines(&self.path, &content)?;
        tracing::debug!(
            path = %self.path.display(),
            count = attacks.len(),
            "Attacks loaded"
        );
        Ok(attacks)
    }

    fn name(&self) -> &str {
        "file"
    }
}

async fn append_line(file: &mut File, line: &[u8], sync: bool) -> std::io::Result<()> {
    file.write_all(line).await?;
    file.flush().await?;
    if sync {
        file.sync_data().await?;
    }
    Ok(())
}

/// File length once any torn trailing record has been dropped
async fn line_aligned_len(file: &mut File, path: &Path) -> Result<u64> {
    let len = file
        .metadata()
        .await
        .map_err(|e| write_error(path, e))?
        .len();
    if len == 0 {
        return Ok(0);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))
        .await
        .map_err(|e| write_error(path, e))?;
    file.read_exact(&mut last)
        .await
        .map_err(|e| write_error(path, e))?;

    if last[0] == b'\n' {
        Ok(len)
    } else {
        repair_torn_tail(path).await
    }
}

fn write_error(path: &Path, e: std::io::Error) -> AttackStoreError {
    AttackStoreError::storage("save", format!("failed to append to {}: {}", path.display(), e))
}

fn parse_lines(path: &Path, content: &str) -> Result<Vec<Attack>> {
    let complete = content.is_empty() || content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();
    let mut attacks = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if !complete && idx == lines.len() - 1 {
            tracing::warn!(
                path = %path.display(),
                line = idx + 1,
                "Skipping unterminated trailing record"
            );
            break;
        }

        let attack = serde_json::from_str(line).map_err(|e| {
            AttackStoreError::storage(
                "load",
                format!("corrupt record at {}:{}: {}", path.display(), idx + 1, e),
            )
        })?;
        attacks.push(attack);
    }

    Ok(attacks)
}

/// Drop any bytes after the last newline (an interrupted append)
///
/// Returns the resulting file length.
async fn repair_torn_tail(path: &Path) -> Result<u64> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(AttackStoreError::storage(
                "open",
                format!("failed to read {}: {}", path.display(), e),
            ))
        }
    };

    if bytes.is_empty() || bytes.ends_with(b"\n") {
        return Ok(bytes.len() as u64);
    }

    let keep = bytes
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |pos| pos + 1);

    tracing::warn!(
        path = %path.display(),
        discarded = bytes.len() - keep,
        "Truncating torn trailing record"
    );

    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .await
        .map_err(|e| AttackStoreError::storage("open", e))?;
    file.set_len(keep as u64)
        .await
        .map_err(|e| AttackStoreError::storage("open", e))?;
    Ok(keep as u64)
}
