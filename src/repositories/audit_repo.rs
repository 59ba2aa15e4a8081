//! 审计日志持久化（追加写入的 JSON Lines 文件）

use crate::errors::AppError;
use crate::models::AuditLogEntry;
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 审计日志落盘接口（只追加，历史只能按保留期整体裁剪）
pub trait AuditSink: Send + Sync {
    fn append(&self, entry: &AuditLogEntry) -> Result<(), AppError>;

    /// 只保留 `cutoff` 及之后的条目，返回删除的条数
    fn retain(&self, cutoff: DateTime<Utc>) -> Result<usize, AppError>;
}

/// JSON Lines 文件落盘，每条审计日志一行
pub struct JsonlAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditSink {
    /// 打开（或创建）落盘文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        tracing::info!(path = %path.display(), "审计日志落盘文件已打开");

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// 读取已落盘的全部条目（按写入顺序，旧的在前）
    ///
    /// 无法解析的行会被跳过并记录警告。
    pub fn replay(&self) -> Result<Vec<AuditLogEntry>, AppError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditLogEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = line_no + 1,
                    error = %e,
                    "跳过无法解析的审计日志行"
                ),
            }
        }

        Ok(entries)
    }
}

impl AuditSink for JsonlAuditSink {
    fn append(&self, entry: &AuditLogEntry) -> Result<(), AppError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = self.file.lock()?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn retain(&self, cutoff: DateTime<Utc>) -> Result<usize, AppError> {
        // 持有文件锁直到替换完成，期间的追加会等待
        let mut file = self.file.lock()?;
        let entries = self.replay()?;
        let total = entries.len();

        let compacted = self.path.with_extension("compact");
        let mut kept = 0;
        {
            let mut out = BufWriter::new(File::create(&compacted)?);
            for entry in entries.iter().filter(|entry| entry.timestamp >= cutoff) {
                serde_json::to_writer(&mut out, entry)?;
                out.write_all(b"\n")?;
                kept += 1;
            }
            out.flush()?;
        }

        std::fs::rename(&compacted, &self.path)?;
        *file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        tracing::info!(
            path = %self.path.display(),
            removed = total - kept,
            remaining = kept,
            "审计日志落盘文件已裁剪"
        );

        Ok(total - kept)
    }
}
