//! 错误定义模块

use thiserror::Error;

/// 标注系统统一错误类型
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("分区选择不完整: {0}")]
    IncompleteSelection(String),

    #[error("{zone} 分区必须指定子区 (section)")]
    MissingRequiredSection { zone: String },

    #[error("分区重复: {0}")]
    DuplicateSector(String),

    #[error("病灶未找到: #{0}")]
    NotFound(u32),

    #[error("输入格式无效: {0}")]
    InvalidInputFormat(String),

    #[error("分区索引越界: {index} (共 {len} 个)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("取值无效: {0}")]
    InvalidValue(String),

    #[error("字段 {field} 不属于导出格式 {schema}")]
    UnsupportedField { field: String, schema: String },

    #[error("目录中不存在该分区: {0}")]
    UnknownCatalogSector(String),

    #[error("命令错误: {0}")]
    Command(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 标注系统统一结果类型
pub type Result<T> = std::result::Result<T, LabelError>;
