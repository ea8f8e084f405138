use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, warn};

use crate::finops::review::error::{Result, ToolError};
use crate::finops::review::model::{
    BenchmarkCategory, BenchmarkTargets, ExpenseRow, PlSummary, RevenueStream, SourceData,
};

pub const BENCHMARKS_SHEET: &str = "Benchmarks";
pub const PL_SUMMARY_SHEET: &str = "P&L Summary";
pub const EMPLOYEES_SHEET: &str = "Empl.";
pub const OPEX_SHEET: &str = "OPEX - NEmpl.";
pub const COGS_SHEET: &str = "COGS - NEmpl.";
pub const REVENUE_SHEETS: [&str; 3] = ["RecurringRevenue", "PSORevenue", "PerpetualRevenue"];

/// Benchmarks sheet row holding the target margin rather than a category.
pub const MARGIN_ROW: &str = "Margin";
/// Benchmarks sheet row holding the total expense target.
pub const EXPENSE_TOTAL_ROW: &str = "Expense Total";

const REVENUE_SUFFIX: &str = "Revenue";
const REVENUE_FIRST_ROW: u32 = 3;
const REVENUE_AMOUNT_COLUMN: u32 = 3;

/// Where the fields of an expense table live. Rows and columns are zero
/// based and absolute, regardless of where the sheet's used range starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseLayout {
    pub first_row: u32,
    pub function_group: u32,
    pub department: u32,
    pub category: Option<u32>,
    pub amount: u32,
}

/// Employee table: Function L2 in D, department in E, annual cost in G.
pub const EMPLOYEE_LAYOUT: ExpenseLayout = ExpenseLayout {
    first_row: 3,
    function_group: 3,
    department: 4,
    category: None,
    amount: 6,
};

/// OPEX and COGS tables: Function L2 in B, department in C, category in D,
/// annual total in F.
pub const NON_EMPLOYEE_LAYOUT: ExpenseLayout = ExpenseLayout {
    first_row: 2,
    function_group: 1,
    department: 2,
    category: Some(3),
    amount: 5,
};

/// Reads the input P&L workbook into [`SourceData`].
pub fn read_source(path: &Path) -> Result<SourceData> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let benchmarks = read_benchmarks(&read_required_sheet(&mut workbook, BENCHMARKS_SHEET)?);
    let pl_summary = read_pl_summary(&read_required_sheet(&mut workbook, PL_SUMMARY_SHEET)?);

    let mut revenue_streams = Vec::with_capacity(REVENUE_SHEETS.len());
    for sheet_name in REVENUE_SHEETS {
        let range = read_required_sheet(&mut workbook, sheet_name)?;
        revenue_streams.push(read_revenue_stream(&range, sheet_name));
    }

    let employees = read_expense_rows(
        &read_required_sheet(&mut workbook, EMPLOYEES_SHEET)?,
        EMPLOYEE_LAYOUT,
    );
    let opex = read_expense_rows(
        &read_required_sheet(&mut workbook, OPEX_SHEET)?,
        NON_EMPLOYEE_LAYOUT,
    );
    let cogs = read_expense_rows(
        &read_required_sheet(&mut workbook, COGS_SHEET)?,
        NON_EMPLOYEE_LAYOUT,
    );

    debug!(
        benchmarks = benchmarks.entries.len(),
        pl_lines = pl_summary.lines.len(),
        employees = employees.len(),
        opex = opex.len(),
        cogs = cogs.len(),
        "source sheets read"
    );

    Ok(SourceData {
        benchmarks,
        pl_summary,
        revenue_streams,
        employees,
        opex,
        cogs,
    })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn read_benchmarks(range: &Range<DataType>) -> BenchmarkTargets {
    let mut targets = BenchmarkTargets::default();

    for row in 1..row_end(range) {
        let Some(label) = cell_to_text(cell(range, row, 0)) else {
            continue;
        };
        let Some(target) = cell_to_number(cell(range, row, 1)) else {
            continue;
        };

        match label.as_str() {
            MARGIN_ROW => targets.margin = Some(target),
            EXPENSE_TOTAL_ROW => targets.expense_total = Some(target),
            other => match BenchmarkCategory::from_label(other) {
                Some(category) => targets.set(category, target),
                None => warn!(label = other, row, "ignoring unknown benchmark category"),
            },
        }
    }

    targets
}

fn read_pl_summary(range: &Range<DataType>) -> PlSummary {
    let lines = (1..row_end(range))
        .filter_map(|row| {
            let label = cell_to_text(cell(range, row, 0))?;
            let value = cell_to_number(cell(range, row, 1))?;
            Some((label, value))
        })
        .collect();
    PlSummary { lines }
}

fn read_revenue_stream(range: &Range<DataType>, sheet_name: &str) -> RevenueStream {
    let mut total = 0.0;
    let mut count = 0;
    for row in REVENUE_FIRST_ROW..row_end(range) {
        match cell_to_number(cell(range, row, REVENUE_AMOUNT_COLUMN)) {
            Some(amount) if amount != 0.0 => {
                total += amount;
                count += 1;
            }
            _ => {}
        }
    }

    let name = sheet_name
        .strip_suffix(REVENUE_SUFFIX)
        .unwrap_or(sheet_name)
        .to_string();
    RevenueStream { name, total, count }
}

fn read_expense_rows(range: &Range<DataType>, layout: ExpenseLayout) -> Vec<ExpenseRow> {
    (layout.first_row..row_end(range))
        .map(|row| ExpenseRow {
            function_group: cell_to_text(cell(range, row, layout.function_group)),
            department: cell_to_text(cell(range, row, layout.department)),
            category: layout
                .category
                .and_then(|column| cell_to_text(cell(range, row, column))),
            amount: cell_to_number(cell(range, row, layout.amount)),
        })
        .filter(|row| row != &ExpenseRow::default())
        .collect()
}

/// Exclusive upper bound of the rows holding data.
fn row_end(range: &Range<DataType>) -> u32 {
    range.end().map(|(row, _)| row + 1).unwrap_or(0)
}

fn cell(range: &Range<DataType>, row: u32, column: u32) -> Option<&DataType> {
    range.get_value((row, column))
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn cell_to_text(cell: Option<&DataType>) -> Option<String> {
    let value = cell_to_string(cell);
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn cell_to_number(cell: Option<&DataType>) -> Option<f64> {
    match cell {
        Some(DataType::Float(value)) if value.is_finite() => Some(*value),
        Some(DataType::Int(value)) => Some(*value as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(cells: &[((u32, u32), DataType)]) -> Range<DataType> {
        let end_row = cells.iter().map(|((row, _), _)| *row).max().unwrap_or(0);
        let end_column = cells.iter().map(|((_, column), _)| *column).max().unwrap_or(0);
        let mut range = Range::new((0, 0), (end_row, end_column));
        for (position, value) in cells {
            range.set_value(*position, value.clone());
        }
        range
    }

    fn text(value: &str) -> DataType {
        DataType::String(value.to_string())
    }

    #[test]
    fn benchmarks_split_special_rows() {
        let sheet = range(&[
            ((0, 0), text("Category")),
            ((1, 0), text("Shared Services")),
            ((1, 1), DataType::Float(0.045)),
            ((2, 0), text("Margin")),
            ((2, 1), DataType::Float(0.7)),
            ((3, 0), text("Expense Total")),
            ((3, 1), DataType::Float(0.3)),
            ((4, 0), text("Widgets")),
            ((4, 1), DataType::Float(0.1)),
            ((5, 0), text("Sales")),
            ((5, 1), text("n/a")),
        ]);
        let targets = read_benchmarks(&sheet);
        assert_eq!(targets.entries, vec![(BenchmarkCategory::SharedServices, 0.045)]);
        assert_eq!(targets.margin, Some(0.7));
        assert_eq!(targets.expense_total, Some(0.3));
    }

    #[test]
    fn repeated_benchmark_rows_collapse_into_one_entry() {
        let sheet = range(&[
            ((1, 0), text("Shared Services")),
            ((1, 1), DataType::Float(0.045)),
            ((2, 0), text("Sales")),
            ((2, 1), DataType::Float(0.05)),
            ((3, 0), text("Shared Services")),
            ((3, 1), DataType::Float(0.05)),
        ]);
        let targets = read_benchmarks(&sheet);
        assert_eq!(
            targets.entries,
            vec![
                (BenchmarkCategory::SharedServices, 0.05),
                (BenchmarkCategory::Sales, 0.05),
            ]
        );
    }

    #[test]
    fn revenue_stream_counts_non_zero_amounts() {
        let sheet = range(&[
            ((2, 3), text("2018 total")),
            ((3, 3), DataType::Float(100.0)),
            ((4, 3), DataType::Int(50)),
            ((5, 3), DataType::Float(0.0)),
            ((6, 3), text("pending")),
        ]);
        let stream = read_revenue_stream(&sheet, "RecurringRevenue");
        assert_eq!(stream.name, "Recurring");
        assert_eq!(stream.total, 150.0);
        assert_eq!(stream.count, 2);
    }

    #[test]
    fn expense_rows_keep_non_numeric_amounts_as_missing() {
        let sheet = range(&[
            ((2, 1), text("G&A")),
            ((2, 2), text(" Legal ")),
            ((2, 3), text("Outsourced Services")),
            ((2, 5), DataType::Float(12.5)),
            ((3, 1), text("S&M")),
            ((3, 2), text("Sales")),
            ((3, 5), text("TBD")),
            ((5, 1), text("R&D")),
        ]);
        let rows = read_expense_rows(&sheet, NON_EMPLOYEE_LAYOUT);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            ExpenseRow::new("G&A", "Legal", 12.5).with_category("Outsourced Services")
        );
        assert_eq!(rows[1].amount, None);
        assert_eq!(rows[2].department, None);
    }

    #[test]
    fn numbers_only_from_numeric_cells() {
        assert_eq!(cell_to_number(Some(&DataType::Int(7))), Some(7.0));
        assert_eq!(cell_to_number(Some(&text("7"))), None);
        assert_eq!(cell_to_number(Some(&DataType::Bool(true))), None);
        assert_eq!(cell_to_number(None), None);
    }
}
