//! 配置管理
//!
//! 配置来源依次叠加：内置默认值、可选的 TOML 文件、`PROSPECT_` 前缀的环境变量
//! （嵌套键用 `__` 分隔，例如 `PROSPECT_EXPORT__OUTPUT_DIR`）。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use prospect_core::utils::DEFAULT_EXPORT_STEM;
use prospect_core::{LabelError, SchemaVersion};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// 标注工具完整配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotatorConfig {
    /// 导出配置
    pub export: ExportConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 导出配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// 导出格式版本
    pub schema: SchemaVersion,
    /// 导出目录
    pub output_dir: String,
    /// 未知报告文件名时的导出文件名（不含扩展名）
    pub default_stem: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// 日志级别或 EnvFilter 指令
    pub level: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            schema: SchemaVersion::default(),
            output_dir: "./labels".to_string(),
            default_stem: DEFAULT_EXPORT_STEM.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AnnotatorConfig {
    /// 加载配置并校验
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&AnnotatorConfig::default()).context("Failed to build default configuration")?,
        );

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("PROSPECT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration")?;

        let config: AnnotatorConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        ConfigValidator::new().validate(&config)?;

        if let Some(path) = config_path {
            info!("Configuration loaded successfully from: {}", path);
        }
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&AnnotatorConfig) -> prospect_core::Result<()>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "export.output_dir",
                validator: |config| {
                    if config.export.output_dir.trim().is_empty() {
                        Err(LabelError::Config("Output directory cannot be empty".to_string()))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "export.default_stem",
                validator: |config| {
                    let stem = config.export.default_stem.trim();
                    if stem.is_empty() || stem.contains(['/', '\\']) {
                        Err(LabelError::Config(format!(
                            "Default export name must be a plain file name: {}",
                            stem
                        )))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| {
                    if config.logging.level.trim().is_empty() {
                        Err(LabelError::Config("Log level cannot be empty".to_string()))
                    } else {
                        Ok(())
                    }
                },
            },
        ];

        Self { validation_rules }
    }

    pub fn validate(&self, config: &AnnotatorConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::Error::new(e).context(format!("Invalid configuration value: {}", rule.field_path)));
            }
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
