//! 病灶分区集合
//!
//! 保持插入顺序的分区序列。所有修改都先经过 `position` 的相等性检查，
//! 因此序列中不会出现两个相等的分区。

use prospect_core::{LabelError, Result, SectorKey};
use tracing::debug;

/// 切换操作的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorToggle {
    Added,
    Removed,
}

/// 单个病灶的分区集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectorSet {
    sectors: Vec<SectorKey>,
}

impl SectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &SectorKey) -> Option<usize> {
        self.sectors.iter().position(|existing| existing == key)
    }

    pub fn contains(&self, key: &SectorKey) -> bool {
        self.position(key).is_some()
    }

    /// 已存在则移除，否则追加到末尾
    pub fn toggle(&mut self, key: SectorKey) -> SectorToggle {
        match self.position(&key) {
            Some(index) => {
                self.sectors.remove(index);
                debug!("移除分区 {}", key);
                SectorToggle::Removed
            }
            None => {
                self.sectors.push(key);
                debug!("添加分区 {}", key);
                SectorToggle::Added
            }
        }
    }

    /// 不存在时追加，返回是否添加
    pub fn add_if_absent(&mut self, key: SectorKey) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.sectors.push(key);
        true
    }

    /// 与 `add_if_absent` 相同，但重复时返回 `DuplicateSector`
    pub fn add_validated(&mut self, key: SectorKey) -> Result<()> {
        if self.add_if_absent(key) {
            Ok(())
        } else {
            Err(LabelError::DuplicateSector(key.to_string()))
        }
    }

    /// 按位置移除，越界时报错
    pub fn remove_at(&mut self, index: usize) -> Result<SectorKey> {
        if index >= self.sectors.len() {
            return Err(LabelError::IndexOutOfRange {
                index,
                len: self.sectors.len(),
            });
        }
        Ok(self.sectors.remove(index))
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SectorKey> {
        self.sectors.iter()
    }

    pub fn as_slice(&self) -> &[SectorKey] {
        &self.sectors
    }
}

/// 收集时去重，保留首次出现的位置
impl FromIterator<SectorKey> for SectorSet {
    fn from_iter<I: IntoIterator<Item = SectorKey>>(iter: I) -> Self {
        let mut set = SectorSet::new();
        for key in iter {
            set.add_if_absent(key);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SectorSet {
    type Item = &'a SectorKey;
    type IntoIter = std::slice::Iter<'a, SectorKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.sectors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SectorCatalog;
    use prospect_core::{Region, Section, Side, ZonePlacement};

    fn pz(region: Region, side: Side, section: Section) -> SectorKey {
        SectorKey::new(region, side, ZonePlacement::Peripheral(section))
    }

    fn sample_set() -> SectorSet {
        [
            pz(Region::Base, Side::Left, Section::PosteriorMedial),
            SectorKey::new(Region::Mid, Side::Right, ZonePlacement::AnteriorFibromuscularStroma),
            SectorKey::new(Region::Base, Side::Left, ZonePlacement::Central),
        ]
        .into_iter()
        .collect()
    }

    fn assert_no_duplicates(set: &SectorSet) {
        for (i, a) in set.iter().enumerate() {
            for b in &set.as_slice()[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut set = SectorSet::new();
        let key = pz(Region::Apex, Side::Left, Section::Anterior);

        assert_eq!(set.toggle(key), SectorToggle::Added);
        assert!(set.contains(&key));
        assert_eq!(set.toggle(key), SectorToggle::Removed);
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle_pair_restores_absent_key() {
        let original = sample_set();

        for entry in SectorCatalog::new().entries() {
            if original.contains(&entry.key) {
                continue;
            }
            let mut set = original.clone();
            assert_eq!(set.toggle(entry.key), SectorToggle::Added);
            assert_no_duplicates(&set);
            assert_eq!(set.toggle(entry.key), SectorToggle::Removed);
            assert_eq!(set, original, "{}", entry.id);
        }
    }

    #[test]
    fn test_toggle_pair_moves_present_key_last() {
        let original = sample_set();

        for key in original.as_slice() {
            let mut set = original.clone();
            assert_eq!(set.toggle(*key), SectorToggle::Removed);
            assert_eq!(set.toggle(*key), SectorToggle::Added);

            // 元素不变，只是该分区移到末尾
            let mut expected: Vec<SectorKey> = original.iter().copied().filter(|k| k != key).collect();
            expected.push(*key);
            assert_eq!(set.as_slice(), expected.as_slice(), "{}", key);
            assert_no_duplicates(&set);
        }
    }

    #[test]
    fn test_toggle_never_duplicates() {
        let mut set = sample_set();
        for entry in SectorCatalog::new().entries() {
            set.toggle(entry.key);
            assert_no_duplicates(&set);
        }
    }

    #[test]
    fn test_toggle_removal_keeps_order() {
        let mut set = sample_set();
        let middle = set.as_slice()[1];

        set.toggle(middle);
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0], pz(Region::Base, Side::Left, Section::PosteriorMedial));
        assert_eq!(
            set.as_slice()[1],
            SectorKey::new(Region::Base, Side::Left, ZonePlacement::Central)
        );

        // 再次添加时追加到末尾
        set.toggle(middle);
        assert_eq!(set.as_slice()[2], middle);
    }

    #[test]
    fn test_add_if_absent() {
        let mut set = SectorSet::new();
        let key = pz(Region::Mid, Side::Right, Section::PosteriorLateral);

        assert!(set.add_if_absent(key));
        assert!(!set.add_if_absent(key));
        assert_eq!(set.len(), 1);

        assert!(matches!(set.add_validated(key), Err(LabelError::DuplicateSector(_))));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_at() {
        let mut set = sample_set();

        let removed = set.remove_at(0).unwrap();
        assert_eq!(removed, pz(Region::Base, Side::Left, Section::PosteriorMedial));
        assert_eq!(set.len(), 2);

        let err = set.remove_at(2).unwrap_err();
        assert!(matches!(err, LabelError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_collect_dedupes() {
        let key = pz(Region::Base, Side::Right, Section::Anterior);
        let set: SectorSet = vec![key, key, key].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
