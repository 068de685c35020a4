//! 病灶管理
//!
//! 以数字编号标识病灶。新编号取现有最大编号加一（空集合时为 1），
//! 因此删除最大编号后再新增会重新使用该编号。

use crate::sector_set::SectorSet;
use prospect_core::{LabelError, Result};
use tracing::{info, warn};

/// PI-RADS 评分范围
pub const PIRADS_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// 病灶
#[derive(Debug, Clone, PartialEq)]
pub struct Lesion {
    id: u32,
    pirads: Option<u8>,
    size: Option<f64>, // 最大径 (mm) 或体积，字段名由导出格式决定
    sectors: SectorSet,
}

impl Lesion {
    fn new(id: u32) -> Self {
        Self {
            id,
            pirads: None,
            size: None,
            sectors: SectorSet::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn pirads(&self) -> Option<u8> {
        self.pirads
    }

    pub fn size(&self) -> Option<f64> {
        self.size
    }

    pub fn sectors(&self) -> &SectorSet {
        &self.sectors
    }

    pub fn sectors_mut(&mut self) -> &mut SectorSet {
        &mut self.sectors
    }
}

/// 病灶的部分更新
///
/// 外层 `None` 表示不修改该字段，`Some(None)` 表示清空。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LesionUpdate {
    pub pirads: Option<Option<u8>>,
    pub size: Option<Option<f64>>,
    pub sectors: Option<SectorSet>,
}

impl LesionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pirads(mut self, pirads: Option<u8>) -> Self {
        self.pirads = Some(pirads);
        self
    }

    pub fn size(mut self, size: Option<f64>) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sectors(mut self, sectors: SectorSet) -> Self {
        self.sectors = Some(sectors);
        self
    }

    /// 在写入任何字段之前检查取值
    fn check(&self) -> Result<()> {
        if let Some(Some(score)) = self.pirads {
            if !PIRADS_RANGE.contains(&score) {
                return Err(LabelError::InvalidValue(format!("PI-RADS 评分必须在 1-5 之间: {}", score)));
            }
        }
        if let Some(Some(size)) = self.size {
            check_measurement("lesion size", size)?;
        }
        Ok(())
    }
}

/// 测量值必须为有限的非负数
pub fn check_measurement(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LabelError::InvalidValue(format!("{} 必须为非负数: {}", name, value)))
    }
}

/// 病灶集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LesionStore {
    lesions: Vec<Lesion>,
}

impl LesionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u32 {
        self.lesions.iter().map(|lesion| lesion.id).max().map_or(1, |max| max + 1)
    }

    /// 新增空病灶并返回
    pub fn add(&mut self) -> &Lesion {
        let id = self.next_id();
        self.lesions.push(Lesion::new(id));
        info!("新增病灶 #{}", id);
        &self.lesions[self.lesions.len() - 1]
    }

    /// 删除病灶，不存在时不做任何事
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.lesions.len();
        self.lesions.retain(|lesion| lesion.id != id);
        let removed = self.lesions.len() != before;
        if removed {
            info!("删除病灶 #{}", id);
        }
        removed
    }

    /// 合并部分字段
    pub fn update(&mut self, id: u32, update: LesionUpdate) -> Result<&Lesion> {
        let lesion = self.find_mut(id).ok_or_else(|| {
            warn!("更新失败，病灶 #{} 不存在", id);
            LabelError::NotFound(id)
        })?;

        // 取值检查在任何写入之前
        update.check()?;

        if let Some(pirads) = update.pirads {
            lesion.pirads = pirads;
        }
        if let Some(size) = update.size {
            lesion.size = size;
        }
        if let Some(sectors) = update.sectors {
            lesion.sectors = sectors;
        }

        Ok(&*lesion)
    }

    pub fn find(&self, id: u32) -> Option<&Lesion> {
        self.lesions.iter().find(|lesion| lesion.id == id)
    }

    pub fn find_mut(&mut self, id: u32) -> Option<&mut Lesion> {
        self.lesions.iter_mut().find(|lesion| lesion.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lesion> {
        self.lesions.iter()
    }

    pub fn len(&self) -> usize {
        self.lesions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lesions.is_empty()
    }
}
