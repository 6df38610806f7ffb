use crate::domain::entities::rule::Severity;
use crate::domain::live_edit::CellStatus;

pub fn root_container_style() -> &'static str {
    "height: 100vh; display: flex; flex-direction: column; box-sizing: border-box; padding: 12px; font-family: sans-serif; gap: 8px;"
}

pub fn toolbar_style() -> &'static str {
    "display: flex; gap: 12px; align-items: center; flex-wrap: wrap; padding: 8px 0;"
}

pub fn table_container_style() -> &'static str {
    "flex: 1; min-height: 0; overflow: auto; border: 1px solid #ddd;"
}

pub fn table_header_cell_style() -> &'static str {
    "border: 1px solid #bbb; padding: 6px; background: #f2f2f2; position: sticky; top: 0; z-index: 1;"
}

pub fn button_style(enabled: bool) -> String {
    let (background, cursor) = if enabled {
        ("#fff", "pointer")
    } else {
        ("#eee", "not-allowed")
    };
    format!(
        "border: 1px solid #bbb; background: {background}; padding: 4px 10px; border-radius: 6px; cursor: {cursor};"
    )
}

pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal => "#8b0000",
        Severity::Error => "#d22",
        Severity::Warning => "#d98c00",
        Severity::Info => "#2a6fd6",
    }
}

pub fn severity_background(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal => "#f6c6c6",
        Severity::Error => "#fde2e2",
        Severity::Warning => "#fff4d6",
        Severity::Info => "#e4eeff",
    }
}

pub fn row_style(deleted: bool, selected: bool) -> String {
    format!(
        "{}{}",
        if selected { "background: #eef4ff;" } else { "" },
        if deleted {
            "text-decoration: line-through; color: #999; background: #f7f7f7;"
        } else {
            ""
        }
    )
}

/// Edited cells are tinted; a validation error paints over the tint.
pub fn cell_style(status: &CellStatus<'_>) -> String {
    let mut style = String::from("border: 1px solid #bbb; padding: 4px; white-space: nowrap;");
    if let Some(error) = status.error {
        style.push_str(&format!(
            " background: {}; outline: 2px solid {}; outline-offset: -2px;",
            severity_background(error.severity),
            severity_color(error.severity)
        ));
    } else if status.edited && !status.deleted {
        style.push_str(" background: #fff7cc;");
    }
    style
}

pub fn badge_style(severity: Severity) -> String {
    format!(
        "display: inline-block; padding: 2px 8px; border-radius: 10px; color: #fff; background: {}; font-size: 12px;",
        severity_color(severity)
    )
}
