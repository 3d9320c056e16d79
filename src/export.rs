use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dashboard::Section;
use crate::rankings::{Cell, ResultTable};

const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub sheets: usize,
    pub rows: usize,
    /// Titles of sections that failed and were left out.
    pub skipped: Vec<String>,
}

/// Write every successful section to its own worksheet.
pub fn export_sections(path: &Path, sections: &[Section]) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    let mut report = ExportReport {
        sheets: 0,
        rows: 0,
        skipped: Vec::new(),
    };

    for section in sections {
        let Some(table) = section.table() else {
            report.skipped.push(section.title().to_string());
            continue;
        };
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(section.title()))?;
        write_table(sheet, table)?;
        report.sheets += 1;
        report.rows += table.len();
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed creating {}", dir.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(report)
}

/// Excel sheet names: at most 31 chars, none of `[]:*?/\`.
pub fn sheet_name(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '-',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect::<String>()
        .trim()
        .to_string()
}

fn write_table(worksheet: &mut Worksheet, table: &ResultTable) -> Result<()> {
    worksheet
        .write_string(0, 0, &table.index_column)
        .context("write index header")?;
    for (col_idx, column) in table.columns.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16 + 1, column)
            .with_context(|| format!("write header {column}"))?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let r = row_idx as u32 + 1;
        worksheet
            .write_string(r, 0, &row.index)
            .with_context(|| format!("write cell ({r},0)"))?;
        for (col_idx, cell) in row.cells.iter().enumerate() {
            let c = col_idx as u16 + 1;
            let written = match cell {
                Cell::Int(v) => worksheet.write_number(r, c, *v as f64).map(|_| ()),
                Cell::Float(v) => worksheet.write_number(r, c, *v).map(|_| ()),
                Cell::Text(v) => worksheet.write_string(r, c, v).map(|_| ()),
                Cell::Empty => Ok(()),
            };
            written.with_context(|| format!("write cell ({r},{c})"))?;
        }
    }
    Ok(())
}
