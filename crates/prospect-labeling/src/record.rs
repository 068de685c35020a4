//! 标注记录
//!
//! 一份报告对应一条记录：全局结论、测量值和病灶集合。

use crate::lesion_store::{check_measurement, LesionStore};
use prospect_core::{BinaryChoice, Finding, LabelError, Result, SchemaVersion};
use std::collections::BTreeMap;
use tracing::warn;

/// 单份报告的完整标注
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelRecord {
    schema: SchemaVersion,
    findings: BTreeMap<Finding, BinaryChoice>,
    psa: Option<f64>,             // ng/mL
    prostate_volume: Option<f64>, // cc
    main_findings: Option<String>,
    lesions: LesionStore,
}

impl LabelRecord {
    /// 创建空记录：无病灶，所有字段未设置
    pub fn new(schema: SchemaVersion) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// 未设置的结论返回 `BinaryChoice::Unset`
    pub fn finding(&self, finding: Finding) -> BinaryChoice {
        self.findings.get(&finding).copied().unwrap_or_default()
    }

    pub fn set_finding(&mut self, finding: Finding, choice: BinaryChoice) -> Result<()> {
        if !self.schema.recognizes(finding) {
            return Err(self.unsupported(finding.as_str()));
        }
        match choice {
            BinaryChoice::Unset => self.findings.remove(&finding),
            _ => self.findings.insert(finding, choice),
        };
        Ok(())
    }

    pub fn psa(&self) -> Option<f64> {
        self.psa
    }

    pub fn set_psa(&mut self, psa: Option<f64>) -> Result<()> {
        if let Some(value) = psa {
            check_measurement("psa", value)?;
        }
        self.psa = psa;
        Ok(())
    }

    pub fn prostate_volume(&self) -> Option<f64> {
        self.prostate_volume
    }

    pub fn set_prostate_volume(&mut self, volume: Option<f64>) -> Result<()> {
        if let Some(value) = volume {
            check_measurement("prostate_volume", value)?;
        }
        self.prostate_volume = volume;
        Ok(())
    }

    pub fn main_findings(&self) -> Option<&str> {
        self.main_findings.as_deref()
    }

    /// 仅 v2 格式支持；空白文本视为未设置
    pub fn set_main_findings(&mut self, text: Option<String>) -> Result<()> {
        if !self.schema.has_main_findings() {
            return Err(self.unsupported("main_findings"));
        }
        self.main_findings = text.filter(|t| !t.trim().is_empty());
        Ok(())
    }

    pub fn lesions(&self) -> &LesionStore {
        &self.lesions
    }

    pub fn lesions_mut(&mut self) -> &mut LesionStore {
        &mut self.lesions
    }

    fn unsupported(&self, field: &str) -> LabelError {
        warn!("字段 {} 不属于导出格式 {}", field, self.schema);
        LabelError::UnsupportedField {
            field: field.to_string(),
            schema: self.schema.name().to_string(),
        }
    }
}
