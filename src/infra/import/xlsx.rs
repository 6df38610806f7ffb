use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use crate::domain::entities::dataset::TabularData;

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// Reads one worksheet (the first when `sheet` is `None`); its first row is the header.
pub fn read_xlsx_table(xlsx_path: &Path, sheet: Option<&str>) -> Result<TabularData> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open workbook: {}", xlsx_path.display()))?;
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .context("workbook has no sheets")?,
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

    let mut all_rows = range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect::<Vec<_>>());
    let columns: Vec<String> = all_rows
        .next()
        .context("sheet is empty")?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    // trailing blank header cells are formatting noise
    let width = columns
        .iter()
        .rposition(|c| !c.is_empty())
        .map(|idx| idx + 1)
        .context("sheet header is blank")?;
    let columns = columns[..width].to_vec();
    if columns.iter().any(|c| c.is_empty()) {
        anyhow::bail!("sheet header contains a blank column name")
    }

    let rows = all_rows
        .filter(|row| row.iter().any(|value| !value.trim().is_empty()))
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect();

    Ok(TabularData { columns, rows })
}
