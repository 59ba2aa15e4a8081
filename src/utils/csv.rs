//! 审计日志 CSV 导出

use crate::models::AuditLogEntry;
use crate::utils::format_iso8601;

/// 导出表头（9 列）
pub const AUDIT_CSV_HEADER: [&str; 9] = [
    "Timestamp",
    "Admin ID",
    "Admin Email",
    "Action",
    "Resource",
    "Resource ID",
    "IP Address",
    "Result",
    "Details",
];

/// 渲染为逗号分隔文本
///
/// 只有 `details` 列会加引号（内部引号双写），其他字段原样输出。
pub fn render_audit_csv<'a>(
    entries: impl IntoIterator<Item = &'a AuditLogEntry>,
) -> Result<String, serde_json::Error> {
    let mut out = AUDIT_CSV_HEADER.join(",");

    for entry in entries {
        let details = serde_json::to_string(&entry.details)?.replace('"', "\"\"");
        let row = [
            format_iso8601(&entry.timestamp),
            entry.admin_id.clone(),
            entry.admin_email.clone(),
            entry.action.to_string(),
            entry.resource.clone(),
            entry.resource_id.clone().unwrap_or_default(),
            entry.ip_address.clone(),
            entry.result.to_string(),
            format!("\"{}\"", details),
        ];
        out.push('\n');
        out.push_str(&row.join(","));
    }

    Ok(out)
}
