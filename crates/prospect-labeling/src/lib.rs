//! # PROSPECT 标注模块
//!
//! 提供报告标注的数据模型与修改规则，包括：
//! - 分区目录：三个层面参考图上的分区定义与坐标命中
//! - 分区集合：单个病灶的有序、去重分区序列
//! - 手工录入校验：分区与子区的适用规则
//! - 病灶管理与标注记录
//! - 标注会话：当前报告与记录的生命周期

pub mod catalog;
pub mod lesion_store;
pub mod record;
pub mod sector_set;
pub mod session;
pub mod validator;

// 重新导出主要类型
pub use catalog::{SectorBounds, SectorCatalog, SectorCatalogEntry};
pub use lesion_store::{Lesion, LesionStore, LesionUpdate, PIRADS_RANGE};
pub use record::LabelRecord;
pub use sector_set::{SectorSet, SectorToggle};
pub use session::{AnnotationSession, Report, SessionOverview};
pub use validator::SectorEntryValidator;
