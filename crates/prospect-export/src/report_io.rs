//! 报告读取与导出写入
//!
//! 核心逻辑只接收文本并产出导出结果，文件传输在这里完成。

use crate::exporter::CanonicalRecord;
use prospect_core::utils::has_text_extension;
use prospect_core::{LabelError, Result};
use prospect_labeling::Report;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 报告读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportLoader;

impl ReportLoader {
    pub fn new() -> Self {
        Self
    }

    /// 读取 `.txt` 报告
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<Report> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| LabelError::InvalidInputFormat(format!("不是文件路径: {}", path.display())))?;

        // 先检查类型，避免读取无关文件
        Self::check_filename(&filename)?;

        let bytes = tokio::fs::read(path).await?;
        let report = self.read_buffer(Some(filename), bytes)?;

        info!("已读取报告: {}", path.display());
        Ok(report)
    }

    /// 由已取得的内容构造报告
    pub fn read_buffer(&self, filename: Option<String>, bytes: Vec<u8>) -> Result<Report> {
        if let Some(name) = &filename {
            Self::check_filename(name)?;
        }

        let text = String::from_utf8(bytes).map_err(|_| {
            warn!("报告内容不是有效的 UTF-8 文本: {}", filename.as_deref().unwrap_or("<未命名>"));
            LabelError::InvalidInputFormat("报告内容不是文本".to_string())
        })?;

        Ok(Report::new(filename, text))
    }

    fn check_filename(filename: &str) -> Result<()> {
        if has_text_extension(filename) {
            Ok(())
        } else {
            warn!("拒绝非文本报告: {}", filename);
            Err(LabelError::InvalidInputFormat(format!("请选择 .txt 文件: {}", filename)))
        }
    }
}

/// 导出写入器
#[derive(Debug, Clone)]
pub struct ExportWriter {
    output_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 写入导出文件，返回完整路径
    pub async fn write(&self, filename: &str, record: &CanonicalRecord) -> Result<PathBuf> {
        let full_path = self.output_dir.join(filename);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = record.to_json_pretty()?;
        tokio::fs::write(&full_path, json).await?;

        info!("导出文件已写入: {}", full_path.display());
        Ok(full_path)
    }
}
