//! 通用工具函数

/// 未知报告文件名时的默认导出名
pub const DEFAULT_EXPORT_STEM: &str = "label";

/// 由报告文件名推导导出文件名
///
/// 去掉结尾的 `.txt`（不区分大小写）后追加 `.json`；没有文件名时使用 `default_stem`。
pub fn suggested_export_filename(report_filename: Option<&str>, default_stem: &str) -> String {
    let stem = match report_filename.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => strip_txt_extension(name),
        None => default_stem,
    };
    format!("{}.json", stem)
}

fn strip_txt_extension(name: &str) -> &str {
    let len = name.len();
    if len >= 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".txt") {
        &name[..len - 4]
    } else {
        name
    }
}

/// 检查文件名是否为纯文本报告
pub fn has_text_extension(name: &str) -> bool {
    strip_txt_extension(name).len() != name.len()
}
