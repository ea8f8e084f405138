use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use finops_review::config::AnalysisConfig;
use finops_review::io::narrative_write;
use finops_review::narrative::{FIX, PROBLEM_STATEMENT, ROOT_CAUSE};
use finops_review::report::{
    BENCHMARK_MAPPING_SHEET, DEEP_DIVE_SHEET, EMPLOYEE_ANALYSIS_SHEET, REVENUE_ANALYSIS_SHEET,
    SHARED_SERVICES_SHEET,
};
use finops_review::{ToolError, pipeline};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tempfile::tempdir;

type Row<'a> = (&'a str, &'a str, Option<&'a str>, f64);

fn write_labelled(sheet: &mut Worksheet, rows: &[(&str, f64)]) -> Result<(), XlsxError> {
    sheet.write_string(0, 0, "Label")?;
    sheet.write_string(0, 1, "Value")?;
    for (index, (label, value)) in rows.iter().enumerate() {
        let row = index as u32 + 1;
        sheet.write_string(row, 0, *label)?;
        sheet.write_number(row, 1, *value)?;
    }
    Ok(())
}

fn write_revenue(sheet: &mut Worksheet, amounts: &[f64]) -> Result<(), XlsxError> {
    sheet.write_string(2, 3, "Amount")?;
    for (index, amount) in amounts.iter().enumerate() {
        sheet.write_number(index as u32 + 3, 3, *amount)?;
    }
    Ok(())
}

/// Writes expense rows at absolute positions; `columns` holds the function
/// group, department, category and amount columns.
fn write_expenses(
    sheet: &mut Worksheet,
    first_row: u32,
    columns: (u16, u16, u16, u16),
    rows: &[Row],
) -> Result<(), XlsxError> {
    let (group_column, department_column, category_column, amount_column) = columns;
    for header_row in 0..first_row {
        sheet.write_string(header_row, 0, "Header")?;
    }
    for (index, (group, department, category, amount)) in rows.iter().enumerate() {
        let row = first_row + index as u32;
        sheet.write_string(row, group_column, *group)?;
        sheet.write_string(row, department_column, *department)?;
        if let Some(category) = category {
            sheet.write_string(row, category_column, *category)?;
        }
        sheet.write_number(row, amount_column, *amount)?;
    }
    Ok(())
}

fn write_input(path: &Path, include_cogs: bool) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();

    write_labelled(
        workbook.add_worksheet().set_name("Benchmarks")?,
        &[
            ("Shared Services", 0.045),
            ("Executive Team", 0.01),
            ("Sales", 0.05),
            ("Margin", 0.70),
            ("Expense Total", 0.30),
        ],
    )?;
    write_labelled(
        workbook.add_worksheet().set_name("P&L Summary")?,
        &[("Revenue", 10_000.0), ("Expense", 6_000.0), ("Margin", 4_000.0)],
    )?;
    write_revenue(
        workbook.add_worksheet().set_name("RecurringRevenue")?,
        &[5_000.0, 3_000.0],
    )?;
    write_revenue(workbook.add_worksheet().set_name("PSORevenue")?, &[1_500.0])?;
    write_revenue(workbook.add_worksheet().set_name("PerpetualRevenue")?, &[500.0, 0.0])?;

    write_expenses(
        workbook.add_worksheet().set_name("Empl.")?,
        3,
        (3, 4, 5, 6),
        &[
            ("G&A", "Finance & Accounting", None, 400.0),
            ("G&A", "Legal", None, 100.0),
            ("S&M", "Sales", None, 700.0),
        ],
    )?;
    write_expenses(
        workbook.add_worksheet().set_name("OPEX - NEmpl.")?,
        2,
        (1, 2, 3, 5),
        &[("G&A", "Finance & Accounting", Some("Outsourced Services"), 250.0)],
    )?;
    if include_cogs {
        write_expenses(
            workbook.add_worksheet().set_name("COGS - NEmpl.")?,
            2,
            (1, 2, 3, 5),
            &[("Cost of Product", "Cloud Operations", Some("Hosting"), 320.0)],
        )?;
    }

    workbook.save(path)
}

fn read_sheet(path: &Path, name: &str) -> Range<DataType> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("output workbook opened");
    workbook
        .worksheet_range(name)
        .expect("sheet present")
        .expect("sheet readable")
}

fn text_at(range: &Range<DataType>, row: u32, column: u32) -> Option<String> {
    match range.get_value((row, column)) {
        Some(DataType::String(value)) => Some(value.clone()),
        _ => None,
    }
}

fn number_at(range: &Range<DataType>, row: u32, column: u32) -> Option<f64> {
    match range.get_value((row, column)) {
        Some(DataType::Float(value)) => Some(*value),
        Some(DataType::Int(value)) => Some(*value as f64),
        _ => None,
    }
}

#[test]
fn source_workbook_is_read_from_fixed_positions() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("pl.xlsx");
    write_input(&input, true).expect("input written");

    let source = pipeline::load_source(&input).expect("source loaded");

    assert_eq!(source.revenue().expect("revenue present").amount(), 10_000.0);
    assert_eq!(source.benchmarks.entries.len(), 3);
    assert_eq!(source.benchmarks.margin, Some(0.70));
    assert_eq!(source.benchmarks.expense_total, Some(0.30));
    assert_eq!(source.employees.len(), 3);
    assert_eq!(source.opex.len(), 1);
    assert_eq!(source.cogs.len(), 1);

    let recurring = source.stream("Recurring").expect("recurring stream");
    assert_eq!(recurring.total, 8_000.0);
    assert_eq!(recurring.count, 2);
    assert_eq!(source.stream("Perpetual").map(|stream| stream.count), Some(1));
}

#[test]
fn analysis_workbook_contains_every_report_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("pl.xlsx");
    let output = temp_dir.path().join("analysis.xlsx");
    write_input(&input, true).expect("input written");

    let report = pipeline::analyze_workbook(&input, &output, &AnalysisConfig::default())
        .expect("analysis written");
    assert_eq!(report.comparison.total(), 1_770.0);
    assert_eq!(report.focus_total(), 650.0);

    let workbook: Xlsx<_> = open_workbook(&output).expect("output workbook opened");
    assert_eq!(
        workbook.sheet_names().to_vec(),
        vec![
            REVENUE_ANALYSIS_SHEET.to_string(),
            BENCHMARK_MAPPING_SHEET.to_string(),
            SHARED_SERVICES_SHEET.to_string(),
            DEEP_DIVE_SHEET.to_string(),
            EMPLOYEE_ANALYSIS_SHEET.to_string(),
        ]
    );

    let mapping = read_sheet(&output, BENCHMARK_MAPPING_SHEET);
    assert_eq!(text_at(&mapping, 0, 0).as_deref(), Some("Benchmark Category"));
    assert_eq!(text_at(&mapping, 1, 0).as_deref(), Some("Shared Services"));
    assert_eq!(number_at(&mapping, 1, 3), Some(750.0));
    assert_eq!(text_at(&mapping, 1, 7).as_deref(), Some("Over"));
    assert_eq!(text_at(&mapping, 2, 0).as_deref(), Some("Sales"));
    assert_eq!(text_at(&mapping, 3, 0).as_deref(), Some("Hosting"));
    assert_eq!(text_at(&mapping, 4, 0).as_deref(), Some("TOTAL"));
    assert_eq!(number_at(&mapping, 4, 3), Some(1_770.0));

    let breakdown = read_sheet(&output, SHARED_SERVICES_SHEET);
    assert_eq!(text_at(&breakdown, 0, 0).as_deref(), Some("G&A Sub-Department"));
    assert_eq!(text_at(&breakdown, 1, 0).as_deref(), Some("Finance & Accounting"));
    assert_eq!(number_at(&breakdown, 1, 4), Some(650.0));
    assert_eq!(text_at(&breakdown, 2, 0).as_deref(), Some("Legal"));
    assert_eq!(number_at(&breakdown, 3, 4), Some(750.0));

    let employees = read_sheet(&output, EMPLOYEE_ANALYSIS_SHEET);
    assert_eq!(number_at(&employees, 1, 1), Some(176_000.0));
    assert_eq!(text_at(&employees, 1, 3).as_deref(), Some("VP of Finance"));
}

#[test]
fn narrative_is_written_as_json_and_text() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("pl.xlsx");
    let output = temp_dir.path().join("narrative.json");
    let text = temp_dir.path().join("narrative.txt");
    write_input(&input, true).expect("input written");

    let document =
        pipeline::generate_narrative(&input, &output, Some(&text), &AnalysisConfig::default())
            .expect("narrative written");

    let restored = narrative_write::read_json(&output).expect("narrative read");
    assert_eq!(restored, document);
    assert_eq!(restored.function, "Operations");
    let problem = restored.section(PROBLEM_STATEMENT).expect("problem statement");
    assert!(problem.contains("$10K in revenue"));
    assert!(problem.contains("(40.00% margin) versus the 70% target"));
    assert!(restored.section(ROOT_CAUSE).is_some());
    assert!(
        restored
            .section(FIX)
            .expect("fix section")
            .contains("Annual savings: $2,622,076")
    );

    let rendered = std::fs::read_to_string(&text).expect("text narrative read");
    assert!(rendered.starts_with("Function: Operations\n"));
    assert!(rendered.contains("\nProblem Statement\n=================\n"));
}

#[test]
fn missing_sheet_is_reported_by_name() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("pl.xlsx");
    write_input(&input, false).expect("input written");

    let error = pipeline::load_source(&input).expect_err("COGS sheet is missing");
    match error {
        ToolError::InvalidWorkbook(message) => assert!(message.contains("COGS - NEmpl.")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_input_is_rejected_before_writing() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("absent.xlsx");
    let output = temp_dir.path().join("analysis.xlsx");

    let error = pipeline::analyze_workbook(&input, &output, &AnalysisConfig::default())
        .expect_err("input is absent");
    assert!(matches!(error, ToolError::MissingInput(path) if path == input));
    assert!(!output.exists());
}
