//! Analysis results and their rendering as workbook tables.
//!
//! [`AnalysisReport`] holds every computed figure. [`AnalysisReport::workbook`]
//! flattens it into [`SheetTable`]s that the Excel writer materialises one
//! sheet each, in order.

pub mod format;
mod sheets;

use serde::Serialize;
use tracing::{debug, info};

use crate::finops::review::aggregate::{
    BenchmarkComparison, CategoryTotals, DepartmentBreakdown, DepartmentLine,
};
use crate::finops::review::config::AnalysisConfig;
use crate::finops::review::cost_model::CostModel;
use crate::finops::review::error::Result;
use crate::finops::review::model::{BenchmarkCategory, PlSummary, Revenue, RevenueStream, SourceData};

pub const REVENUE_ANALYSIS_SHEET: &str = "Revenue Analysis";
pub const BENCHMARK_MAPPING_SHEET: &str = "Benchmark Mapping";
pub const SHARED_SERVICES_SHEET: &str = "SS Breakdown";
pub const DEEP_DIVE_SHEET: &str = "FA Deep Dive";
pub const EMPLOYEE_ANALYSIS_SHEET: &str = "FA Employee Analysis";

/// Label of the P&L Summary line holding the actual margin.
pub const MARGIN_LABEL: &str = "Margin";

/// A single typed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Text(String),
    Currency(f64),
    Percent(f64),
    Count(f64),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn count(value: impl Into<f64>) -> Self {
        CellValue::Count(value.into())
    }
}

/// Emphasis applied to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowStyle {
    Data,
    /// Row singled out for attention, e.g. the focus department.
    Highlight,
    Total,
    /// Column headings of a secondary section within the sheet.
    SectionHeader,
    /// Label/text pair below the table.
    Note,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub style: RowStyle,
    pub cells: Vec<CellValue>,
}

impl ReportRow {
    pub fn new(style: RowStyle, cells: Vec<CellValue>) -> Self {
        Self { style, cells }
    }

    pub fn data(cells: Vec<CellValue>) -> Self {
        Self::new(RowStyle::Data, cells)
    }

    pub fn total(cells: Vec<CellValue>) -> Self {
        Self::new(RowStyle::Total, cells)
    }

    pub fn note(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            RowStyle::Note,
            vec![CellValue::text(label), CellValue::text(text)],
        )
    }

    pub fn blank() -> Self {
        Self::new(RowStyle::Data, Vec::new())
    }
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl SheetTable {
    pub fn new(sheet_name: &str, columns: &[&str]) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    /// First row whose leading cell is the text `label`.
    pub fn row_labelled(&self, label: &str) -> Option<&ReportRow> {
        self.rows
            .iter()
            .find(|row| matches!(row.cells.first(), Some(CellValue::Text(text)) if text == label))
    }
}

/// Represents all tables required to materialise the report workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// Every figure derived from the source workbook and the configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub revenue: Revenue,
    pub pl_summary: PlSummary,
    pub revenue_streams: Vec<RevenueStream>,
    pub margin_target: Option<f64>,
    pub shared_services_target: f64,
    pub comparison: BenchmarkComparison,
    pub breakdown: DepartmentBreakdown,
    pub focus_department: String,
    pub cost_model: CostModel,
}

impl AnalysisReport {
    /// Runs aggregation, the department breakdown, and the cost model.
    pub fn build(source: &SourceData, config: &AnalysisConfig) -> Result<Self> {
        let revenue = source.revenue()?;
        let totals = CategoryTotals::from_source(source);
        debug!(
            categories = totals.categories().len(),
            grand_total = totals.grand_total(),
            "aggregated category totals"
        );
        let comparison = BenchmarkComparison::build(&totals, &source.benchmarks, revenue);
        let breakdown =
            DepartmentBreakdown::build(&source.employees, &source.opex, &config.shared_services_group);
        let cost_model = CostModel::build(config)?;
        info!(
            revenue = revenue.amount(),
            expense_share = comparison.share_of_revenue(),
            departments = breakdown.lines.len(),
            savings = cost_model.savings.savings,
            "analysis complete"
        );

        Ok(Self {
            revenue,
            pl_summary: source.pl_summary.clone(),
            revenue_streams: source.revenue_streams.clone(),
            margin_target: source.benchmarks.margin,
            shared_services_target: source
                .benchmarks
                .target_for(BenchmarkCategory::SharedServices),
            comparison,
            breakdown,
            focus_department: config.focus_department.clone(),
            cost_model,
        })
    }

    /// Actual margin as a share of revenue, when the P&L Summary has one.
    pub fn actual_margin(&self) -> Option<f64> {
        self.pl_summary
            .get(MARGIN_LABEL)
            .map(|margin| self.revenue.share_of(margin))
    }

    /// Breakdown line of the focus department.
    pub fn focus_line(&self) -> Option<&DepartmentLine> {
        self.breakdown.line(&self.focus_department)
    }

    /// Focus department cost from the breakdown, zero when absent.
    pub fn focus_total(&self) -> f64 {
        self.focus_line().map(DepartmentLine::total).unwrap_or(0.0)
    }

    /// Revenue streams sorted by amount, largest first.
    pub fn streams_by_amount(&self) -> Vec<&RevenueStream> {
        let mut streams: Vec<&RevenueStream> = self.revenue_streams.iter().collect();
        streams.sort_by(|lhs, rhs| rhs.total.total_cmp(&lhs.total));
        streams
    }

    /// Flattens the report into workbook tables.
    pub fn workbook(&self) -> WorkbookData {
        WorkbookData {
            tables: vec![
                sheets::revenue_analysis(self),
                sheets::benchmark_mapping(self),
                sheets::shared_services_breakdown(self),
                sheets::deep_dive(self),
                sheets::employee_analysis(self),
            ],
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::finops::review::model::{BenchmarkTargets, ExpenseRow, REVENUE_LABEL};
    use BenchmarkCategory::*;

    pub(crate) fn sample_source() -> SourceData {
        SourceData {
            benchmarks: BenchmarkTargets {
                entries: vec![
                    (SharedServices, 0.045),
                    (ExecutiveTeam, 0.01),
                    (Sales, 0.05),
                    (Marketing, 0.02),
                    (Hosting, 0.03),
                    (Engineering, 0.10),
                ],
                margin: Some(0.70),
                expense_total: Some(0.30),
            },
            pl_summary: PlSummary {
                lines: vec![
                    (REVENUE_LABEL.to_string(), 10_000.0),
                    ("Expense".to_string(), 6_000.0),
                    (MARGIN_LABEL.to_string(), 4_000.0),
                ],
            },
            revenue_streams: vec![
                RevenueStream {
                    name: "PSO".into(),
                    total: 1_500.0,
                    count: 3,
                },
                RevenueStream {
                    name: "Recurring".into(),
                    total: 8_000.0,
                    count: 40,
                },
                RevenueStream {
                    name: "Perpetual".into(),
                    total: 500.0,
                    count: 0,
                },
            ],
            employees: vec![
                ExpenseRow::new("G&A", "Finance & Accounting", 400.0),
                ExpenseRow::new("G&A", "Finance & Accounting", 200.0),
                ExpenseRow::new("G&A", "Legal", 100.0),
                ExpenseRow::new("G&A", "Corporate", 300.0),
                ExpenseRow::new("S&M", "Sales", 700.0),
                ExpenseRow::new("R&D", "Product Development", 900.0),
            ],
            opex: vec![
                ExpenseRow::new("G&A", "Finance & Accounting", 250.0).with_category("Outsourced Services"),
                ExpenseRow::new("S&M", "Marketing", 150.0).with_category("Events"),
            ],
            cogs: vec![
                ExpenseRow::new("Cost of Product", "Cloud Operations", 320.0).with_category("Hosting"),
                ExpenseRow::new("Cost of Product", "Cloud Operations", 80.0).with_category("Personnel"),
            ],
        }
    }

    pub(crate) fn sample_report() -> AnalysisReport {
        AnalysisReport::build(&sample_source(), &AnalysisConfig::default()).expect("report built")
    }

    #[test]
    fn report_collects_every_stage() {
        let report = sample_report();
        assert_eq!(report.revenue.amount(), 10_000.0);
        assert_eq!(report.comparison.total(), 3_400.0);
        assert_eq!(report.shared_services_target, 0.045);
        assert_eq!(report.actual_margin(), Some(0.4));
        assert_eq!(report.focus_total(), 850.0);
        assert_eq!(report.breakdown.employees(), 4);
        assert_eq!(report.cost_model.current.headcount, 18);
    }

    #[test]
    fn report_requires_revenue() {
        let mut source = sample_source();
        source.pl_summary.lines.retain(|(label, _)| label != REVENUE_LABEL);
        assert!(AnalysisReport::build(&source, &AnalysisConfig::default()).is_err());
    }

    #[test]
    fn workbook_has_sheets_in_order() {
        let workbook = sample_report().workbook();
        let names: Vec<&str> = workbook
            .tables
            .iter()
            .map(|table| table.sheet_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                REVENUE_ANALYSIS_SHEET,
                BENCHMARK_MAPPING_SHEET,
                SHARED_SERVICES_SHEET,
                DEEP_DIVE_SHEET,
                EMPLOYEE_ANALYSIS_SHEET,
            ]
        );
    }
}
