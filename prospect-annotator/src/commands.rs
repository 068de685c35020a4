//! 标注命令
//!
//! 每行一条命令，空行和 `#` 开头的行被忽略：
//!
//! ```text
//! finding <name> yes|no|unset
//! set psa|prostate_volume <number>|unset
//! set main_findings <text...>|unset
//! lesion add
//! lesion remove <id>
//! lesion <id> pirads <1-5>|unset
//! lesion <id> size <number>|unset
//! sector <id> toggle <catalog-id>
//! sector <id> pick <region> <x> <y>
//! sector <id> add <region> <side> <zone> [section]
//! sector <id> remove <index>
//! sector <id> clear
//! ```

use prospect_core::{BinaryChoice, Finding, LabelError, Region, Result};
use prospect_labeling::{AnnotationSession, LesionUpdate, SectorSet, SectorToggle};
use std::str::FromStr;

/// 解析后的命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetFinding(Finding, BinaryChoice),
    SetPsa(Option<f64>),
    SetProstateVolume(Option<f64>),
    SetMainFindings(Option<String>),
    AddLesion,
    RemoveLesion(u32),
    SetPirads { lesion: u32, pirads: Option<u8> },
    SetSize { lesion: u32, size: Option<f64> },
    ToggleSector { lesion: u32, sector_id: String },
    PickSector { lesion: u32, region: Region, x: f32, y: f32 },
    AddSector {
        lesion: u32,
        region: String,
        side: String,
        zone: String,
        section: Option<String>,
    },
    RemoveSector { lesion: u32, index: usize },
    ClearSectors(u32),
}

fn command_error(line: &str, reason: &str) -> LabelError {
    LabelError::Command(format!("{}: {}", reason, line.trim()))
}

fn number<T: FromStr>(line: &str, raw: Option<&str>, what: &str) -> Result<T> {
    let raw = raw.ok_or_else(|| command_error(line, &format!("缺少{}", what)))?;
    raw.parse::<T>()
        .map_err(|_| command_error(line, &format!("{}无效: {}", what, raw)))
}

/// `unset` 表示清空
fn optional_number<T: FromStr>(line: &str, raw: Option<&str>, what: &str) -> Result<Option<T>> {
    match raw {
        Some("unset") => Ok(None),
        other => number(line, other, what).map(Some),
    }
}

/// 解析一行命令；空行和注释返回 `None`
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let command = match tokens.as_slice() {
        ["finding", name, value] => Command::SetFinding(name.parse()?, value.parse()?),
        ["set", "psa", value] => Command::SetPsa(optional_number(line, Some(*value), "PSA")?),
        ["set", "prostate_volume", value] => {
            Command::SetProstateVolume(optional_number(line, Some(*value), "前列腺体积")?)
        }
        ["set", "main_findings", ..] => {
            let text = trimmed["set".len()..].trim_start()["main_findings".len()..].trim();
            match text {
                "" | "unset" => Command::SetMainFindings(None),
                text => Command::SetMainFindings(Some(text.to_string())),
            }
        }
        ["lesion", "add"] => Command::AddLesion,
        ["lesion", "remove", id] => Command::RemoveLesion(number(line, Some(*id), "病灶编号")?),
        ["lesion", id, "pirads", value] => Command::SetPirads {
            lesion: number(line, Some(*id), "病灶编号")?,
            pirads: optional_number(line, Some(*value), "PI-RADS 评分")?,
        },
        ["lesion", id, "size", value] => Command::SetSize {
            lesion: number(line, Some(*id), "病灶编号")?,
            size: optional_number(line, Some(*value), "尺寸")?,
        },
        ["sector", id, "toggle", sector_id] => Command::ToggleSector {
            lesion: number(line, Some(*id), "病灶编号")?,
            sector_id: sector_id.to_string(),
        },
        ["sector", id, "pick", region, x, y] => Command::PickSector {
            lesion: number(line, Some(*id), "病灶编号")?,
            region: region.parse()?,
            x: number(line, Some(*x), "横坐标")?,
            y: number(line, Some(*y), "纵坐标")?,
        },
        ["sector", id, "add", region, side, zone, rest @ ..] if rest.len() <= 1 => Command::AddSector {
            lesion: number(line, Some(*id), "病灶编号")?,
            region: region.to_string(),
            side: side.to_string(),
            zone: zone.to_string(),
            section: rest.first().map(|s| s.to_string()),
        },
        ["sector", id, "remove", index] => Command::RemoveSector {
            lesion: number(line, Some(*id), "病灶编号")?,
            index: number(line, Some(*index), "分区序号")?,
        },
        ["sector", id, "clear"] => Command::ClearSectors(number(line, Some(*id), "病灶编号")?),
        _ => return Err(command_error(line, "无法识别的命令")),
    };

    Ok(Some(command))
}

/// 执行命令，返回简短的结果说明
pub fn apply(session: &mut AnnotationSession, command: Command) -> Result<String> {
    let message = match command {
        Command::SetFinding(finding, choice) => {
            session.record_mut().set_finding(finding, choice)?;
            format!("{} = {:?}", finding.as_str(), choice)
        }
        Command::SetPsa(value) => {
            session.record_mut().set_psa(value)?;
            format!("psa = {:?}", value)
        }
        Command::SetProstateVolume(value) => {
            session.record_mut().set_prostate_volume(value)?;
            format!("prostate_volume = {:?}", value)
        }
        Command::SetMainFindings(text) => {
            let set = text.is_some();
            session.record_mut().set_main_findings(text)?;
            format!("main_findings {}", if set { "已设置" } else { "已清空" })
        }
        Command::AddLesion => format!("新增病灶 #{}", session.add_lesion()),
        Command::RemoveLesion(id) => {
            if session.remove_lesion(id) {
                format!("删除病灶 #{}", id)
            } else {
                format!("病灶 #{} 不存在，忽略", id)
            }
        }
        Command::SetPirads { lesion, pirads } => {
            session.update_lesion(lesion, LesionUpdate::new().pirads(pirads))?;
            format!("病灶 #{} PI-RADS = {:?}", lesion, pirads)
        }
        Command::SetSize { lesion, size } => {
            session.update_lesion(lesion, LesionUpdate::new().size(size))?;
            format!("病灶 #{} 尺寸 = {:?}", lesion, size)
        }
        Command::ToggleSector { lesion, sector_id } => {
            let toggle = session.toggle_catalog_sector(lesion, &sector_id)?;
            describe_toggle(lesion, &sector_id, toggle)
        }
        Command::PickSector { lesion, region, x, y } => match session.pick_sector(lesion, region, x, y)? {
            Some(toggle) => describe_toggle(lesion, &format!("{} ({}, {})", region.as_str(), x, y), toggle),
            None => format!("坐标 ({}, {}) 未命中 {} 层面分区", x, y, region.as_str()),
        },
        Command::AddSector {
            lesion,
            region,
            side,
            zone,
            section,
        } => {
            let key = session.add_manual_sector(lesion, &region, &side, &zone, section.as_deref())?;
            format!("病灶 #{} 添加分区 {}", lesion, key)
        }
        Command::RemoveSector { lesion, index } => {
            let key = session.remove_sector(lesion, index)?;
            format!("病灶 #{} 移除分区 {}", lesion, key)
        }
        Command::ClearSectors(lesion) => {
            session.update_lesion(lesion, LesionUpdate::new().sectors(SectorSet::new()))?;
            format!("病灶 #{} 清空分区", lesion)
        }
    };

    Ok(message)
}

fn describe_toggle(lesion: u32, target: &str, toggle: SectorToggle) -> String {
    match toggle {
        SectorToggle::Added => format!("病灶 #{} 添加分区 {}", lesion, target),
        SectorToggle::Removed => format!("病灶 #{} 移除分区 {}", lesion, target),
    }
}
