//! 标注会话
//!
//! 内存中的单文档：当前报告和它的标注记录。载入新报告总是丢弃旧记录。

use crate::catalog::SectorCatalog;
use crate::lesion_store::LesionUpdate;
use crate::record::LabelRecord;
use crate::sector_set::SectorToggle;
use crate::validator::SectorEntryValidator;
use chrono::{DateTime, Utc};
use prospect_core::{LabelError, Region, Result, SchemaVersion, SectorKey};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// 已载入的报告文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub filename: Option<String>,
    pub text: String,
    pub loaded_at: DateTime<Utc>,
}

impl Report {
    pub fn new(filename: Option<String>, text: String) -> Self {
        Self {
            filename,
            text,
            loaded_at: Utc::now(),
        }
    }
}

/// 会话概览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOverview {
    pub session_id: Uuid,
    pub schema: SchemaVersion,
    pub report_filename: Option<String>,
    pub report_loaded_at: Option<DateTime<Utc>>,
    pub lesion_count: usize,
    pub sector_count: usize,
    pub findings_set: usize,
}

/// 标注会话
#[derive(Debug)]
pub struct AnnotationSession {
    session_id: Uuid,
    schema: SchemaVersion,
    report: Option<Report>,
    record: LabelRecord,
    catalog: SectorCatalog,
    validator: SectorEntryValidator,
}

impl AnnotationSession {
    /// 创建空会话
    pub fn new(schema: SchemaVersion) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            schema,
            report: None,
            record: LabelRecord::new(schema),
            catalog: SectorCatalog::new(),
            validator: SectorEntryValidator::new(),
        }
    }

    /// 载入报告并重置标注记录
    pub fn load_report(&mut self, report: Report) {
        self.session_id = Uuid::new_v4();
        self.record = LabelRecord::new(self.schema);

        info!(
            "会话 {} 载入报告 {} ({} 字符, {})",
            self.session_id,
            report.filename.as_deref().unwrap_or("<未命名>"),
            report.text.chars().count(),
            report.loaded_at.format("%Y-%m-%d %H:%M:%S")
        );
        self.report = Some(report);
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn record(&self) -> &LabelRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut LabelRecord {
        &mut self.record
    }

    pub fn catalog(&self) -> &SectorCatalog {
        &self.catalog
    }

    /// 新增病灶，返回编号
    pub fn add_lesion(&mut self) -> u32 {
        self.record.lesions_mut().add().id()
    }

    pub fn remove_lesion(&mut self, id: u32) -> bool {
        self.record.lesions_mut().remove(id)
    }

    pub fn update_lesion(&mut self, id: u32, update: LesionUpdate) -> Result<()> {
        self.record.lesions_mut().update(id, update).map(|_| ())
    }

    /// 按目录标识切换分区
    pub fn toggle_catalog_sector(&mut self, lesion_id: u32, sector_id: &str) -> Result<SectorToggle> {
        let entry = self
            .catalog
            .find_by_id(sector_id)
            .ok_or_else(|| LabelError::UnknownCatalogSector(sector_id.to_string()))?;
        self.toggle_sector(lesion_id, entry.key)
    }

    /// 按参考图坐标切换分区；未命中任何分区时返回 `None`
    pub fn pick_sector(&mut self, lesion_id: u32, region: Region, x: f32, y: f32) -> Result<Option<SectorToggle>> {
        match self.catalog.lookup_by_geometry(region, x, y) {
            Some(entry) => self.toggle_sector(lesion_id, entry.key).map(Some),
            None => {
                // 坐标落空时仍然要求病灶存在
                self.lesion_exists(lesion_id)?;
                Ok(None)
            }
        }
    }

    /// 切换分区
    pub fn toggle_sector(&mut self, lesion_id: u32, key: SectorKey) -> Result<SectorToggle> {
        let lesion = self
            .record
            .lesions_mut()
            .find_mut(lesion_id)
            .ok_or(LabelError::NotFound(lesion_id))?;
        Ok(lesion.sectors_mut().toggle(key))
    }

    /// 手工录入分区
    ///
    /// 先校验再修改，任何一步失败时病灶保持不变。
    pub fn add_manual_sector(
        &mut self,
        lesion_id: u32,
        region: &str,
        side: &str,
        zone: &str,
        section: Option<&str>,
    ) -> Result<SectorKey> {
        let key = self.validator.validate(region, side, zone, section)?;
        let lesion = self
            .record
            .lesions_mut()
            .find_mut(lesion_id)
            .ok_or(LabelError::NotFound(lesion_id))?;

        if let Err(e) = lesion.sectors_mut().add_validated(key) {
            warn!("病灶 #{} 已包含分区 {}", lesion_id, key);
            return Err(e);
        }
        Ok(key)
    }

    /// 按位置删除分区
    pub fn remove_sector(&mut self, lesion_id: u32, index: usize) -> Result<SectorKey> {
        let lesion = self
            .record
            .lesions_mut()
            .find_mut(lesion_id)
            .ok_or(LabelError::NotFound(lesion_id))?;
        lesion.sectors_mut().remove_at(index)
    }

    fn lesion_exists(&self, lesion_id: u32) -> Result<()> {
        self.record
            .lesions()
            .find(lesion_id)
            .map(|_| ())
            .ok_or(LabelError::NotFound(lesion_id))
    }

    /// 获取会话概览
    pub fn overview(&self) -> SessionOverview {
        let lesions = self.record.lesions();
        SessionOverview {
            session_id: self.session_id,
            schema: self.schema,
            report_filename: self.report.as_ref().and_then(|r| r.filename.clone()),
            report_loaded_at: self.report.as_ref().map(|r| r.loaded_at),
            lesion_count: lesions.len(),
            sector_count: lesions.iter().map(|lesion| lesion.sectors().len()).sum(),
            findings_set: self
                .schema
                .findings()
                .iter()
                .filter(|finding| self.record.finding(**finding).to_export().is_some())
                .count(),
        }
    }
}

impl Default for AnnotationSession {
    fn default() -> Self {
        Self::new(SchemaVersion::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_core::{BinaryChoice, Finding, Section, Zone};

    fn loaded_session() -> AnnotationSession {
        let mut session = AnnotationSession::new(SchemaVersion::V1);
        session.load_report(Report::new(Some("case_001.txt".to_string()), "MRI prostate".to_string()));
        session
    }

    #[test]
    fn test_load_report_resets_record() {
        let mut session = loaded_session();
        let first_id = session.session_id();
        session.add_lesion();
        session.record_mut().set_psa(Some(4.1)).unwrap();
        session
            .record_mut()
            .set_finding(Finding::Epe, BinaryChoice::Yes)
            .unwrap();

        session.load_report(Report::new(Some("case_002.txt".to_string()), "next".to_string()));

        assert_ne!(session.session_id(), first_id);
        assert!(session.record().lesions().is_empty());
        assert_eq!(session.record().psa(), None);
        assert_eq!(session.record().finding(Finding::Epe), BinaryChoice::Unset);
        assert_eq!(session.report().unwrap().filename.as_deref(), Some("case_002.txt"));
    }

    #[test]
    fn test_catalog_toggle() {
        let mut session = loaded_session();
        let id = session.add_lesion();

        let toggle = session
            .toggle_catalog_sector(id, "base-left-pz-posterior-medial")
            .unwrap();
        assert_eq!(toggle, SectorToggle::Added);
        assert_eq!(session.overview().sector_count, 1);

        let toggle = session
            .toggle_catalog_sector(id, "base-left-pz-posterior-medial")
            .unwrap();
        assert_eq!(toggle, SectorToggle::Removed);

        assert!(matches!(
            session.toggle_catalog_sector(id, "nowhere"),
            Err(LabelError::UnknownCatalogSector(_))
        ));
        assert!(matches!(
            session.toggle_catalog_sector(99, "base-left-cz"),
            Err(LabelError::NotFound(99))
        ));
    }

    #[test]
    fn test_pick_sector() {
        let mut session = loaded_session();
        let id = session.add_lesion();

        let toggle = session.pick_sector(id, Region::Base, 25.0, 90.0).unwrap();
        assert_eq!(toggle, Some(SectorToggle::Added));
        assert_eq!(session.pick_sector(id, Region::Base, 50.0, 50.0).unwrap(), None);
        assert!(session.pick_sector(5, Region::Base, 50.0, 50.0).is_err());
    }

    #[test]
    fn test_manual_and_catalog_paths_agree() {
        let mut session = loaded_session();
        let id = session.add_lesion();

        session.toggle_catalog_sector(id, "mid-right-tz-anterior").unwrap();
        let err = session
            .add_manual_sector(id, "mid", "right", "transition", Some("anterior"))
            .unwrap_err();
        assert!(matches!(err, LabelError::DuplicateSector(_)));
        assert_eq!(session.record().lesions().find(id).unwrap().sectors().len(), 1);
    }

    #[test]
    fn test_rejected_manual_entry_leaves_lesion_unchanged() {
        let mut session = loaded_session();
        let id = session.add_lesion();
        session
            .add_manual_sector(id, "apex", "left", "central", Some("anterior"))
            .unwrap();
        let before = session.record().clone();

        assert!(session.add_manual_sector(id, "apex", "left", "peripheral", None).is_err());
        assert!(session.add_manual_sector(id, "", "left", "central", None).is_err());
        assert!(session
            .add_manual_sector(42, "apex", "left", "central", None)
            .is_err());

        assert_eq!(session.record(), &before);
        let key = session.record().lesions().find(id).unwrap().sectors().as_slice()[0];
        assert_eq!(key.zone(), Zone::Central);
        assert_eq!(key.section(), None);
    }

    #[test]
    fn test_remove_sector_by_index() {
        let mut session = loaded_session();
        let id = session.add_lesion();
        session
            .add_manual_sector(id, "base", "right", "peripheral", Some("posterior_lateral"))
            .unwrap();

        assert!(matches!(
            session.remove_sector(id, 1),
            Err(LabelError::IndexOutOfRange { index: 1, len: 1 })
        ));
        let removed = session.remove_sector(id, 0).unwrap();
        assert_eq!(removed.section(), Some(Section::PosteriorLateral));
    }

    #[test]
    fn test_overview() {
        let mut session = loaded_session();
        session.add_lesion();
        session.add_lesion();
        session
            .record_mut()
            .set_finding(Finding::Svi, BinaryChoice::No)
            .unwrap();

        let overview = session.overview();
        assert_eq!(overview.lesion_count, 2);
        assert_eq!(overview.findings_set, 1);
        assert_eq!(overview.report_filename.as_deref(), Some("case_001.txt"));
        assert_eq!(overview.report_loaded_at, session.report().map(|r| r.loaded_at));
        assert!(AnnotationSession::new(SchemaVersion::V2).overview().report_loaded_at.is_none());
    }
}
