//! # PROSPECT 导出模块
//!
//! 标准导出格式转换，以及报告读取、导出写入的文件边界。

pub mod exporter;
pub mod report_io;

pub use exporter::{CanonicalRecord, Exporter};
pub use report_io::{ExportWriter, ReportLoader};
