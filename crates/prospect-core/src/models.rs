//! 核心数据模型定义

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LabelError, Result};

/// 冠状层面
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Apex, // 尖部
    Mid,  // 中部
    Base, // 底部
}

/// 左右侧
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// 组织分区
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Transition,                  // 移行带 TZ
    Peripheral,                  // 外周带 PZ
    Central,                     // 中央带 CZ
    AnteriorFibromuscularStroma, // 前纤维肌肉基质 AFS
}

/// TZ/PZ 的子区
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Anterior,
    PosteriorMedial,
    PosteriorLateral,
    Posterior,
}

/// 统一输入值：去空白、转小写、`-` 视同 `_`
pub fn normalize_token(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('-', "_")
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Base, Region::Mid, Region::Apex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Apex => "apex",
            Region::Mid => "mid",
            Region::Base => "base",
        }
    }
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Transition => "transition",
            Zone::Peripheral => "peripheral",
            Zone::Central => "central",
            Zone::AnteriorFibromuscularStroma => "anterior_fibromuscular_stroma",
        }
    }

    /// 常用缩写 (TZ/PZ/CZ/AFS)
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Zone::Transition => "TZ",
            Zone::Peripheral => "PZ",
            Zone::Central => "CZ",
            Zone::AnteriorFibromuscularStroma => "AFS",
        }
    }

    /// 只有 TZ 和 PZ 细分子区
    pub fn requires_section(&self) -> bool {
        matches!(self, Zone::Transition | Zone::Peripheral)
    }
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Anterior => "anterior",
            Section::PosteriorMedial => "posterior_medial",
            Section::PosteriorLateral => "posterior_lateral",
            Section::Posterior => "posterior",
        }
    }
}

impl FromStr for Region {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "apex" => Ok(Region::Apex),
            "mid" => Ok(Region::Mid),
            "base" => Ok(Region::Base),
            other => Err(LabelError::InvalidValue(format!("未知层面: {}", other))),
        }
    }
}

impl FromStr for Side {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(LabelError::InvalidValue(format!("未知侧别: {}", other))),
        }
    }
}

impl FromStr for Zone {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "transition" | "tz" => Ok(Zone::Transition),
            "peripheral" | "pz" => Ok(Zone::Peripheral),
            "central" | "cz" => Ok(Zone::Central),
            "anterior_fibromuscular_stroma" | "afs" => Ok(Zone::AnteriorFibromuscularStroma),
            other => Err(LabelError::InvalidValue(format!("未知分区: {}", other))),
        }
    }
}

impl FromStr for Section {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "anterior" => Ok(Section::Anterior),
            "posterior_medial" => Ok(Section::PosteriorMedial),
            "posterior_lateral" => Ok(Section::PosteriorLateral),
            "posterior" => Ok(Section::Posterior),
            other => Err(LabelError::InvalidValue(format!("未知子区: {}", other))),
        }
    }
}

/// 分区与子区的合法组合
///
/// TZ/PZ 必须携带子区，CZ/AFS 不能携带子区；非法组合无法用该类型表达。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZonePlacement {
    Transition(Section),
    Peripheral(Section),
    Central,
    AnteriorFibromuscularStroma,
}

impl ZonePlacement {
    /// 由松散的 (zone, section) 组合得到合法放置
    ///
    /// CZ/AFS 上提供的子区会被丢弃而不是报错。
    pub fn resolve(zone: Zone, section: Option<Section>) -> Result<Self> {
        match (zone, section) {
            (Zone::Transition, Some(section)) => Ok(ZonePlacement::Transition(section)),
            (Zone::Peripheral, Some(section)) => Ok(ZonePlacement::Peripheral(section)),
            (Zone::Transition | Zone::Peripheral, None) => Err(LabelError::MissingRequiredSection {
                zone: zone.as_str().to_string(),
            }),
            (Zone::Central, _) => Ok(ZonePlacement::Central),
            (Zone::AnteriorFibromuscularStroma, _) => Ok(ZonePlacement::AnteriorFibromuscularStroma),
        }
    }

    pub const fn zone(&self) -> Zone {
        match self {
            ZonePlacement::Transition(_) => Zone::Transition,
            ZonePlacement::Peripheral(_) => Zone::Peripheral,
            ZonePlacement::Central => Zone::Central,
            ZonePlacement::AnteriorFibromuscularStroma => Zone::AnteriorFibromuscularStroma,
        }
    }

    pub const fn section(&self) -> Option<Section> {
        match self {
            ZonePlacement::Transition(section) | ZonePlacement::Peripheral(section) => Some(*section),
            ZonePlacement::Central | ZonePlacement::AnteriorFibromuscularStroma => None,
        }
    }
}

/// 分区标识
///
/// 两个分区当且仅当 region、side、zone、section 全部相同时相等（缺省子区与缺省子区相等）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectorKey {
    region: Region,
    side: Side,
    placement: ZonePlacement,
}

impl SectorKey {
    /// 唯一的构造入口，目录路径和手工录入路径都经过这里
    pub const fn new(region: Region, side: Side, placement: ZonePlacement) -> Self {
        Self {
            region,
            side,
            placement,
        }
    }

    pub const fn region(&self) -> Region {
        self.region
    }

    pub const fn side(&self) -> Side {
        self.side
    }

    pub const fn zone(&self) -> Zone {
        self.placement.zone()
    }

    pub const fn section(&self) -> Option<Section> {
        self.placement.section()
    }

    pub const fn placement(&self) -> ZonePlacement {
        self.placement
    }
}

impl fmt::Display for SectorKey {
    /// 简写形式，例如 `B-L-PZ-posterior_medial`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = match self.region {
            Region::Apex => 'A',
            Region::Mid => 'M',
            Region::Base => 'B',
        };
        let side = match self.side {
            Side::Left => 'L',
            Side::Right => 'R',
        };
        write!(f, "{}-{}-{}", region, side, self.zone().abbreviation())?;
        if let Some(section) = self.section() {
            write!(f, "-{}", section.as_str())?;
        }
        Ok(())
    }
}

/// 三态二值结论
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BinaryChoice {
    Yes,
    No,
    #[default]
    Unset,
}

impl BinaryChoice {
    /// 导出值：yes -> true, no -> false, 未设置 -> null
    pub fn to_export(&self) -> Option<bool> {
        match self {
            BinaryChoice::Yes => Some(true),
            BinaryChoice::No => Some(false),
            BinaryChoice::Unset => None,
        }
    }
}

impl FromStr for BinaryChoice {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "yes" | "y" | "true" => Ok(BinaryChoice::Yes),
            "no" | "n" | "false" => Ok(BinaryChoice::No),
            "" | "unset" | "n/a" | "na" => Ok(BinaryChoice::Unset),
            other => Err(LabelError::InvalidValue(format!("无效的二值结论: {}", other))),
        }
    }
}

/// 全局二值结论字段
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Finding {
    Epe,                            // 包膜外侵犯
    Svi,                            // 精囊侵犯
    EnlargedLymphNodes,             // 淋巴结肿大
    NeurovascularBundleInvolvement, // 神经血管束受累
    BladderNeckInvolvement,         // 膀胱颈受累
    RectalWallInvolvement,          // 直肠壁受累
}

impl Finding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Finding::Epe => "epe",
            Finding::Svi => "svi",
            Finding::EnlargedLymphNodes => "enlarged_lymph_nodes",
            Finding::NeurovascularBundleInvolvement => "neurovascular_bundle_involvement",
            Finding::BladderNeckInvolvement => "bladder_neck_involvement",
            Finding::RectalWallInvolvement => "rectal_wall_involvement",
        }
    }
}

impl FromStr for Finding {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "epe" => Ok(Finding::Epe),
            "svi" => Ok(Finding::Svi),
            "enlarged_lymph_nodes" => Ok(Finding::EnlargedLymphNodes),
            "neurovascular_bundle_involvement" => Ok(Finding::NeurovascularBundleInvolvement),
            "bladder_neck_involvement" => Ok(Finding::BladderNeckInvolvement),
            "rectal_wall_involvement" => Ok(Finding::RectalWallInvolvement),
            other => Err(LabelError::InvalidValue(format!("未知结论字段: {}", other))),
        }
    }
}

/// 导出格式版本
///
/// 下游数据集存在两套互不兼容的字段集合，这里显式命名而不是猜测。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// 结构受累字段 + `maximum_diameter`，CZ/AFS 分区省略 `section`
    #[default]
    V1,
    /// `main_findings` 文本 + `volume`，CZ/AFS 分区输出 `section: null`
    V2,
}

const V1_FINDINGS: [Finding; 6] = [
    Finding::Epe,
    Finding::Svi,
    Finding::EnlargedLymphNodes,
    Finding::NeurovascularBundleInvolvement,
    Finding::BladderNeckInvolvement,
    Finding::RectalWallInvolvement,
];

const V2_FINDINGS: [Finding; 3] = [Finding::Epe, Finding::Svi, Finding::EnlargedLymphNodes];

impl SchemaVersion {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "prospect-v1",
            SchemaVersion::V2 => "prospect-v2",
        }
    }

    /// 该版本识别的二值结论字段，按导出顺序排列
    pub fn findings(&self) -> &'static [Finding] {
        match self {
            SchemaVersion::V1 => &V1_FINDINGS,
            SchemaVersion::V2 => &V2_FINDINGS,
        }
    }

    pub fn recognizes(&self, finding: Finding) -> bool {
        self.findings().contains(&finding)
    }

    /// 病灶尺寸字段名
    pub fn size_field(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "maximum_diameter",
            SchemaVersion::V2 => "volume",
        }
    }

    pub fn has_main_findings(&self) -> bool {
        matches!(self, SchemaVersion::V2)
    }

    /// CZ/AFS 分区是否输出 `section: null`
    pub fn emits_null_section(&self) -> bool {
        matches!(self, SchemaVersion::V2)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaVersion {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "v1" | "prospect_v1" => Ok(SchemaVersion::V1),
            "v2" | "prospect_v2" => Ok(SchemaVersion::V2),
            other => Err(LabelError::InvalidValue(format!("未知导出格式: {}", other))),
        }
    }
}
