//! 手工分区录入校验
//!
//! 逐字段录入分区时使用；目录中的分区已经是合法的 `SectorKey`，不经过这里。

use prospect_core::{normalize_token, LabelError, Region, Result, Section, SectorKey, Side, Zone, ZonePlacement};
use std::str::FromStr;
use tracing::{debug, warn};

/// 手工分区录入校验器
#[derive(Debug, Clone, Copy, Default)]
pub struct SectorEntryValidator;

impl SectorEntryValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验并构造分区
    ///
    /// 1. region、side、zone 必须非空且可识别，否则 `IncompleteSelection`
    /// 2. TZ/PZ 必须给出可识别的子区，否则 `MissingRequiredSection`
    /// 3. CZ/AFS 忽略任何子区
    pub fn validate(&self, region: &str, side: &str, zone: &str, section: Option<&str>) -> Result<SectorKey> {
        let result = self.build(region, side, zone, section);

        match &result {
            Ok(key) => debug!("手工分区校验通过: {}", key),
            Err(e) => warn!("手工分区校验失败: {}", e),
        }

        result
    }

    fn build(&self, region: &str, side: &str, zone: &str, section: Option<&str>) -> Result<SectorKey> {
        let region: Region = Self::required_field("region", region)?;
        let side: Side = Self::required_field("side", side)?;
        let zone: Zone = Self::required_field("zone", zone)?;

        let section = if zone.requires_section() {
            let raw = section.map(normalize_token).unwrap_or_default();
            if raw.is_empty() {
                return Err(LabelError::MissingRequiredSection {
                    zone: zone.as_str().to_string(),
                });
            }
            let parsed = raw.parse::<Section>().map_err(|_| LabelError::MissingRequiredSection {
                zone: zone.as_str().to_string(),
            })?;
            Some(parsed)
        } else {
            None
        };

        let placement = ZonePlacement::resolve(zone, section)?;
        Ok(SectorKey::new(region, side, placement))
    }

    fn required_field<T>(name: &str, raw: &str) -> Result<T>
    where
        T: FromStr<Err = LabelError>,
    {
        if raw.trim().is_empty() {
            return Err(LabelError::IncompleteSelection(format!("缺少 {}", name)));
        }
        raw.parse::<T>()
            .map_err(|_| LabelError::IncompleteSelection(format!("{} 取值无效: {}", name, raw.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_drops_section() {
        let validator = SectorEntryValidator::new();

        for section in ["anterior", "posterior_medial", "whatever"] {
            let key = validator.validate("base", "left", "central", Some(section)).unwrap();
            assert_eq!(key.zone(), Zone::Central);
            assert_eq!(key.section(), None);
        }

        let key = validator
            .validate("apex", "right", "anterior_fibromuscular_stroma", Some("posterior"))
            .unwrap();
        assert_eq!(key.section(), None);
    }

    #[test]
    fn test_peripheral_requires_section() {
        let validator = SectorEntryValidator::new();

        for section in [None, Some(""), Some("   "), Some("lateral")] {
            let err = validator.validate("mid", "left", "peripheral", section).unwrap_err();
            assert!(matches!(err, LabelError::MissingRequiredSection { .. }), "{:?}", section);
        }

        let key = validator
            .validate("mid", "left", "peripheral", Some("posterior_lateral"))
            .unwrap();
        assert_eq!(key.section(), Some(Section::PosteriorLateral));
    }

    #[test]
    fn test_incomplete_selection() {
        let validator = SectorEntryValidator::new();

        let cases = [
            ("", "left", "transition", Some("anterior")),
            ("base", "", "transition", Some("anterior")),
            ("base", "left", "", Some("anterior")),
            ("lower", "left", "transition", Some("anterior")),
            ("base", "center", "transition", Some("anterior")),
        ];
        for (region, side, zone, section) in cases {
            let err = validator.validate(region, side, zone, section).unwrap_err();
            assert!(matches!(err, LabelError::IncompleteSelection(_)));
        }
    }

    #[test]
    fn test_incomplete_checked_before_section() {
        let validator = SectorEntryValidator::new();
        let err = validator.validate("", "left", "peripheral", None).unwrap_err();
        assert!(matches!(err, LabelError::IncompleteSelection(_)));
    }

    #[test]
    fn test_matches_catalog_keys() {
        let validator = SectorEntryValidator::new();
        let catalog = crate::catalog::SectorCatalog::new();

        let entry = catalog.find_by_id("base-left-pz-posterior-medial").unwrap();
        let key = validator
            .validate("base", "left", "peripheral", Some("posterior-medial"))
            .unwrap();
        assert_eq!(key, entry.key);

        let entry = catalog.find_by_id("base-right-cz").unwrap();
        let key = validator.validate("Base", "Right", "central", Some("anterior")).unwrap();
        assert_eq!(key, entry.key);
    }
}
