//! 标注流程演示程序
//!
//! 展示一次完整的标注会话：
//! - 载入报告文本
//! - 设置二值结论和测量值
//! - 通过目录、坐标和手工三种方式选择分区
//! - 以两种格式版本导出

use anyhow::Result;
use prospect::domain::{BinaryChoice, Finding, Region, SchemaVersion};
use prospect::export::{ExportWriter, Exporter, ReportLoader};
use prospect::labeling::{AnnotationSession, LesionUpdate, SectorCatalog};
use tracing::{info, warn};

const SAMPLE_REPORT: &str = "Prostate MRI. Volume 42 mL. PSA 7.2 ng/mL.\n\
Focal lesion in the left peripheral zone at the base, PI-RADS 4, 12 mm.\n\
No extraprostatic extension. Seminal vesicles are clear.";

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("🚀 启动PROSPECT标注演示");

    demo_catalog();

    for schema in [SchemaVersion::V1, SchemaVersion::V2] {
        demo_session(schema).await?;
    }

    info!("✅ 标注演示完成");
    Ok(())
}

/// 分区目录演示
fn demo_catalog() {
    info!("\n📋 分区目录");
    let catalog = SectorCatalog::new();
    for region in Region::ALL {
        info!("   {}: {} 个分区", region.as_str(), catalog.entries_for_region(region).len());
    }

    match catalog.lookup_by_geometry(Region::Base, 25.0, 90.0) {
        Some(entry) => info!("   (25, 90) 命中 {} -> {}", entry.id, entry.key),
        None => warn!("   (25, 90) 未命中任何分区"),
    }
}

/// 单次标注会话演示
async fn demo_session(schema: SchemaVersion) -> Result<()> {
    info!("\n🩺 标注会话 ({})", schema);

    let mut session = AnnotationSession::new(schema);
    let report = ReportLoader::new().read_buffer(Some("case_001.txt".to_string()), SAMPLE_REPORT.as_bytes().to_vec())?;
    session.load_report(report);

    let record = session.record_mut();
    record.set_psa(Some(7.2))?;
    record.set_prostate_volume(Some(42.0))?;
    record.set_finding(Finding::Epe, BinaryChoice::No)?;
    record.set_finding(Finding::Svi, BinaryChoice::No)?;
    if schema.has_main_findings() {
        record.set_main_findings(Some("Focal PZ lesion, left base".to_string()))?;
    }
    // V2 不识别该字段
    if let Err(e) = record.set_finding(Finding::RectalWallInvolvement, BinaryChoice::No) {
        warn!("   跳过字段: {}", e);
    }

    let lesion = session.add_lesion();
    session.update_lesion(lesion, LesionUpdate::new().pirads(Some(4)).size(Some(12.0)))?;
    session.toggle_catalog_sector(lesion, "base-left-pz-posterior-medial")?;
    session.pick_sector(lesion, Region::Base, 36.0, 6.0)?;
    session.add_manual_sector(lesion, "base", "left", "central", Some("anterior"))?;

    // 重复添加被拒绝
    if let Err(e) = session.add_manual_sector(lesion, "base", "left", "peripheral", Some("posterior_medial")) {
        warn!("   分区未添加: {}", e);
    }

    let overview = session.overview();
    info!(
        "   会话 {}: {} 个病灶, {} 个分区",
        overview.session_id, overview.lesion_count, overview.sector_count
    );

    let exported = Exporter::new().export(session.record());
    println!("{}", exported.to_json_pretty()?);

    let dir = std::env::temp_dir().join("prospect-demo");
    let path = ExportWriter::new(&dir)
        .write(&format!("case_001.{}.json", schema), &exported)
        .await?;
    info!("   已写入 {}", path.display());

    Ok(())
}
