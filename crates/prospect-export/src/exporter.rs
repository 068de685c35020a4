//! 标准导出格式转换
//!
//! 将标注记录转换为下游数据集约定的结构。转换规则：
//! - 二值结论 yes/no/未设置 输出为 true/false/null，格式识别的字段总是全部输出
//! - 未设置的数值与文本输出为 null
//! - 病灶输出 `{id, pirads, <尺寸字段>, sectors}`
//! - TZ/PZ 分区输出 `section`；CZ/AFS 分区在 v1 中省略 `section`，在 v2 中输出 `section: null`
//!
//! 键顺序固定，便于对比导出文件。

use prospect_core::{Result, SchemaVersion, SectorKey};
use prospect_labeling::{LabelRecord, Lesion};
use serde_json::{json, Map, Value};
use tracing::debug;

/// 导出结果
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    schema: SchemaVersion,
    value: Value,
}

impl CanonicalRecord {
    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// 两空格缩进的 JSON 文本
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.value)?)
    }
}

/// 导出器
#[derive(Debug, Clone, Copy, Default)]
pub struct Exporter;

impl Exporter {
    pub fn new() -> Self {
        Self
    }

    /// 按记录自身的格式版本导出，无副作用
    pub fn export(&self, record: &LabelRecord) -> CanonicalRecord {
        let schema = record.schema();
        let mut root = Map::new();

        root.insert("psa".to_string(), json!(record.psa()));
        root.insert("prostate_volume".to_string(), json!(record.prostate_volume()));

        for finding in schema.findings() {
            root.insert(
                finding.as_str().to_string(),
                json!(record.finding(*finding).to_export()),
            );
        }

        if schema.has_main_findings() {
            root.insert("main_findings".to_string(), json!(record.main_findings()));
        }

        let lesions: Vec<Value> = record
            .lesions()
            .iter()
            .map(|lesion| Self::export_lesion(schema, lesion))
            .collect();
        root.insert("lesions".to_string(), Value::Array(lesions));

        debug!("导出 {} 个病灶 ({})", record.lesions().len(), schema);

        CanonicalRecord {
            schema,
            value: Value::Object(root),
        }
    }

    fn export_lesion(schema: SchemaVersion, lesion: &Lesion) -> Value {
        let mut obj = Map::new();
        obj.insert("id".to_string(), json!(lesion.id()));
        obj.insert("pirads".to_string(), json!(lesion.pirads()));
        obj.insert(schema.size_field().to_string(), json!(lesion.size()));

        let sectors: Vec<Value> = lesion
            .sectors()
            .iter()
            .map(|key| Self::export_sector(schema, key))
            .collect();
        obj.insert("sectors".to_string(), Value::Array(sectors));

        Value::Object(obj)
    }

    fn export_sector(schema: SchemaVersion, key: &SectorKey) -> Value {
        let mut obj = Map::new();
        obj.insert("region".to_string(), json!(key.region().as_str()));
        obj.insert("side".to_string(), json!(key.side().as_str()));
        obj.insert("zone".to_string(), json!(key.zone().as_str()));

        match key.section() {
            Some(section) => {
                obj.insert("section".to_string(), json!(section.as_str()));
            }
            None if schema.emits_null_section() => {
                obj.insert("section".to_string(), Value::Null);
            }
            None => {}
        }

        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_core::{BinaryChoice, Finding};
    use prospect_labeling::{AnnotationSession, LesionUpdate};

    fn keys(value: &Value) -> Vec<&str> {
        value.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_empty_record_exports_nulls() {
        let record = LabelRecord::new(SchemaVersion::V1);
        let exported = Exporter::new().export(&record);
        let value = exported.as_value();

        for finding in SchemaVersion::V1.findings() {
            assert_eq!(value[finding.as_str()], Value::Null, "{}", finding.as_str());
        }
        assert_eq!(value["psa"], Value::Null);
        assert_eq!(value["prostate_volume"], Value::Null);
        assert_eq!(value["lesions"], json!([]));
        assert!(value.get("main_findings").is_none());
    }

    #[test]
    fn test_key_order_is_stable() {
        let exported = Exporter::new().export(&LabelRecord::new(SchemaVersion::V1));
        assert_eq!(
            keys(exported.as_value()),
            vec![
                "psa",
                "prostate_volume",
                "epe",
                "svi",
                "enlarged_lymph_nodes",
                "neurovascular_bundle_involvement",
                "bladder_neck_involvement",
                "rectal_wall_involvement",
                "lesions",
            ]
        );

        let exported = Exporter::new().export(&LabelRecord::new(SchemaVersion::V2));
        assert_eq!(
            keys(exported.as_value()),
            vec!["psa", "prostate_volume", "epe", "svi", "enlarged_lymph_nodes", "main_findings", "lesions"]
        );
    }

    #[test]
    fn test_binary_findings_mapping() {
        let mut record = LabelRecord::new(SchemaVersion::V1);
        record.set_finding(Finding::Epe, BinaryChoice::Yes).unwrap();
        record.set_finding(Finding::Svi, BinaryChoice::No).unwrap();

        let value = Exporter::new().export(&record).into_value();
        assert_eq!(value["epe"], json!(true));
        assert_eq!(value["svi"], json!(false));
        assert_eq!(value["rectal_wall_involvement"], Value::Null);
    }

    fn scenario(schema: SchemaVersion) -> Value {
        let mut session = AnnotationSession::new(schema);
        session.record_mut().set_psa(Some(7.2)).unwrap();
        let id = session.add_lesion();
        session
            .update_lesion(id, LesionUpdate::new().pirads(Some(4)).size(Some(12.5)))
            .unwrap();
        session
            .add_manual_sector(id, "base", "left", "peripheral", Some("posterior_medial"))
            .unwrap();
        Exporter::new().export(session.record()).into_value()
    }

    #[test]
    fn test_scenario_v1() {
        let value = scenario(SchemaVersion::V1);

        assert_eq!(value["psa"], json!(7.2));
        let lesion = &value["lesions"][0];
        assert_eq!(keys(lesion), vec!["id", "pirads", "maximum_diameter", "sectors"]);
        assert_eq!(lesion["id"], json!(1));
        assert_eq!(lesion["pirads"], json!(4));
        assert_eq!(lesion["maximum_diameter"], json!(12.5));

        let sectors = lesion["sectors"].as_array().unwrap();
        assert_eq!(sectors.len(), 1);
        assert_eq!(
            sectors[0],
            json!({
                "region": "base",
                "side": "left",
                "zone": "peripheral",
                "section": "posterior_medial"
            })
        );
        assert_eq!(keys(&sectors[0]), vec!["region", "side", "zone", "section"]);
    }

    #[test]
    fn test_scenario_v2() {
        let value = scenario(SchemaVersion::V2);
        let lesion = &value["lesions"][0];

        assert_eq!(keys(lesion), vec!["id", "pirads", "volume", "sectors"]);
        assert_eq!(lesion["volume"], json!(12.5));
        assert_eq!(lesion["sectors"][0]["section"], json!("posterior_medial"));
        assert_eq!(value["main_findings"], Value::Null);
    }

    #[test]
    fn test_unsectioned_zone_per_schema() {
        for (schema, expect_key) in [(SchemaVersion::V1, false), (SchemaVersion::V2, true)] {
            let mut session = AnnotationSession::new(schema);
            let id = session.add_lesion();
            session.toggle_catalog_sector(id, "base-right-cz").unwrap();

            let value = Exporter::new().export(session.record()).into_value();
            let sector = &value["lesions"][0]["sectors"][0];
            assert_eq!(sector["zone"], json!("central"));
            assert_eq!(sector.get("section").is_some(), expect_key, "{}", schema);
            if expect_key {
                assert_eq!(sector["section"], Value::Null);
            }
        }
    }

    #[test]
    fn test_lesion_without_measurements() {
        let mut record = LabelRecord::new(SchemaVersion::V1);
        record.lesions_mut().add();

        let value = Exporter::new().export(&record).into_value();
        assert_eq!(
            value["lesions"],
            json!([{ "id": 1, "pirads": null, "maximum_diameter": null, "sectors": [] }])
        );
    }

    #[test]
    fn test_pretty_json() {
        let mut record = LabelRecord::new(SchemaVersion::V2);
        record
            .set_main_findings(Some("Focal lesion in left PZ".to_string()))
            .unwrap();
        let text = Exporter::new().export(&record).to_json_pretty().unwrap();

        assert!(text.starts_with("{\n  \"psa\": null,"));
        assert!(text.contains("\"main_findings\": \"Focal lesion in left PZ\""));
    }
}
