//! 解剖分区目录
//!
//! 三个层面参考示意图上的分区定义。坐标为参考图宽高的百分比 (0-100)，
//! 属于标定数据，进程内只读。

use once_cell::sync::Lazy;
use prospect_core::{Region, Section, SectorKey, Side, ZonePlacement};
use std::collections::HashMap;
use tracing::debug;

use Region::{Apex, Base, Mid};
use Section::{Anterior, Posterior, PosteriorLateral, PosteriorMedial};
use Side::{Left, Right};
use ZonePlacement::{AnteriorFibromuscularStroma as Afs, Central as Cz, Peripheral as Pz, Transition as Tz};

/// 分区在参考图上的矩形范围（百分比坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SectorBounds {
    /// 点是否落在矩形内（含边界）
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// 两个矩形是否有面积重叠（仅共享边界不算）
    pub fn overlaps(&self, other: &SectorBounds) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// 目录条目
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorCatalogEntry {
    pub id: &'static str,
    pub key: SectorKey,
    pub bounds: SectorBounds,
}

#[allow(clippy::too_many_arguments)]
const fn entry(
    id: &'static str,
    region: Region,
    side: Side,
    placement: ZonePlacement,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> SectorCatalogEntry {
    SectorCatalogEntry {
        id,
        key: SectorKey::new(region, side, placement),
        bounds: SectorBounds { x, y, width, height },
    }
}

/// 参考布局：底部 14 个分区（含中央带），中部和尖部各 12 个
static CATALOG: [SectorCatalogEntry; 38] = [
    // 底部
    entry("base-afs-left", Base, Left, Afs, 35.0, 4.0, 12.0, 8.0),
    entry("base-afs-right", Base, Right, Afs, 53.0, 4.0, 12.0, 8.0),
    entry("base-left-tz-anterior", Base, Left, Tz(Anterior), 23.0, 24.0, 20.0, 20.0),
    entry("base-left-tz-posterior", Base, Left, Tz(Posterior), 24.0, 50.0, 15.0, 8.0),
    entry("base-left-pz-anterior", Base, Left, Pz(Anterior), 3.0, 42.0, 15.0, 6.0),
    entry("base-left-pz-posterior-lateral", Base, Left, Pz(PosteriorLateral), 8.0, 62.0, 15.0, 15.0),
    entry("base-left-pz-posterior-medial", Base, Left, Pz(PosteriorMedial), 19.0, 86.0, 15.0, 10.0),
    entry("base-left-cz", Base, Left, Cz, 27.0, 60.0, 15.0, 10.0),
    entry("base-right-tz-anterior", Base, Right, Tz(Anterior), 57.0, 24.0, 20.0, 20.0),
    entry("base-right-tz-posterior", Base, Right, Tz(Posterior), 61.0, 50.0, 15.0, 8.0),
    entry("base-right-pz-anterior", Base, Right, Pz(Anterior), 82.0, 42.0, 15.0, 6.0),
    entry("base-right-pz-posterior-lateral", Base, Right, Pz(PosteriorLateral), 77.0, 62.0, 15.0, 15.0),
    entry("base-right-pz-posterior-medial", Base, Right, Pz(PosteriorMedial), 66.0, 86.0, 15.0, 10.0),
    entry("base-right-cz", Base, Right, Cz, 58.0, 60.0, 15.0, 10.0),
    // 中部
    entry("mid-afs-left", Mid, Left, Afs, 36.0, 6.0, 12.0, 8.0),
    entry("mid-afs-right", Mid, Right, Afs, 52.0, 6.0, 12.0, 8.0),
    entry("mid-left-tz-anterior", Mid, Left, Tz(Anterior), 24.0, 26.0, 20.0, 20.0),
    entry("mid-left-tz-posterior", Mid, Left, Tz(Posterior), 26.0, 47.0, 14.0, 11.0),
    entry("mid-left-pz-anterior", Mid, Left, Pz(Anterior), 7.0, 39.0, 12.0, 8.0),
    entry("mid-left-pz-posterior-lateral", Mid, Left, Pz(PosteriorLateral), 11.0, 60.0, 12.0, 10.0),
    entry("mid-left-pz-posterior-medial", Mid, Left, Pz(PosteriorMedial), 33.0, 62.0, 15.0, 20.0),
    entry("mid-right-tz-anterior", Mid, Right, Tz(Anterior), 56.0, 26.0, 20.0, 20.0),
    entry("mid-right-tz-posterior", Mid, Right, Tz(Posterior), 60.0, 47.0, 14.0, 11.0),
    entry("mid-right-pz-anterior", Mid, Right, Pz(Anterior), 81.0, 39.0, 12.0, 8.0),
    entry("mid-right-pz-posterior-lateral", Mid, Right, Pz(PosteriorLateral), 77.0, 60.0, 12.0, 10.0),
    entry("mid-right-pz-posterior-medial", Mid, Right, Pz(PosteriorMedial), 52.0, 62.0, 15.0, 20.0),
    // 尖部
    entry("apex-afs-left", Apex, Left, Afs, 35.0, 12.0, 14.0, 8.0),
    entry("apex-afs-right", Apex, Right, Afs, 51.0, 12.0, 14.0, 8.0),
    entry("apex-left-tz-anterior", Apex, Left, Tz(Anterior), 34.0, 27.0, 12.0, 8.0),
    entry("apex-left-tz-posterior", Apex, Left, Tz(Posterior), 32.0, 40.0, 13.0, 12.0),
    entry("apex-left-pz-anterior", Apex, Left, Pz(Anterior), 15.0, 25.0, 15.0, 9.0),
    entry("apex-left-pz-posterior-lateral", Apex, Left, Pz(PosteriorLateral), 11.0, 56.0, 12.0, 10.0),
    entry("apex-left-pz-posterior-medial", Apex, Left, Pz(PosteriorMedial), 30.0, 63.0, 18.0, 12.0),
    entry("apex-right-tz-anterior", Apex, Right, Tz(Anterior), 54.0, 27.0, 12.0, 8.0),
    entry("apex-right-tz-posterior", Apex, Right, Tz(Posterior), 55.0, 40.0, 13.0, 12.0),
    entry("apex-right-pz-anterior", Apex, Right, Pz(Anterior), 70.0, 25.0, 15.0, 9.0),
    entry("apex-right-pz-posterior-lateral", Apex, Right, Pz(PosteriorLateral), 77.0, 56.0, 12.0, 10.0),
    entry("apex-right-pz-posterior-medial", Apex, Right, Pz(PosteriorMedial), 52.0, 63.0, 18.0, 12.0),
];

static BY_ID: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    CATALOG
        .iter()
        .enumerate()
        .map(|(index, entry)| (entry.id, index))
        .collect()
});

/// 分区目录，只提供读访问
#[derive(Debug, Clone, Copy, Default)]
pub struct SectorCatalog;

impl SectorCatalog {
    pub fn new() -> Self {
        Self
    }

    /// 全部条目，按目录顺序
    pub fn entries(&self) -> &'static [SectorCatalogEntry] {
        &CATALOG
    }

    /// 某一层面的条目，按目录顺序
    pub fn entries_for_region(&self, region: Region) -> Vec<&'static SectorCatalogEntry> {
        CATALOG.iter().filter(|entry| entry.key.region() == region).collect()
    }

    /// 按参考图上的归一化坐标查找分区
    ///
    /// 矩形重叠时目录下标最小者优先。
    pub fn lookup_by_geometry(&self, region: Region, x: f32, y: f32) -> Option<&'static SectorCatalogEntry> {
        let found = CATALOG
            .iter()
            .find(|entry| entry.key.region() == region && entry.bounds.contains(x, y));

        match found {
            Some(entry) => debug!("坐标 ({}, {}) 命中分区 {}", x, y, entry.id),
            None => debug!("坐标 ({}, {}) 未命中 {} 层面任何分区", x, y, region.as_str()),
        }

        found
    }

    /// 按稳定标识查找
    pub fn find_by_id(&self, id: &str) -> Option<&'static SectorCatalogEntry> {
        BY_ID.get(id.trim()).map(|&index| &CATALOG[index])
    }

    /// 分区是否在目录中出现
    pub fn contains(&self, key: &SectorKey) -> bool {
        CATALOG.iter().any(|entry| entry.key == *key)
    }
}
