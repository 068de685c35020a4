//! PROSPECT 前列腺MRI报告结构化标注
//!
//! 汇总各子 crate，供示例程序和外部调用使用。

pub use prospect_core as domain;
pub use prospect_export as export;
pub use prospect_labeling as labeling;

pub use prospect_core::{LabelError, Result, SchemaVersion};
pub use prospect_export::{CanonicalRecord, Exporter};
pub use prospect_labeling::{AnnotationSession, LabelRecord, SectorCatalog};
