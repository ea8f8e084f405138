use crate::finops::review::report::format::{money, percent};
use crate::finops::review::report::{
    AnalysisReport, BENCHMARK_MAPPING_SHEET, CellValue, DEEP_DIVE_SHEET, EMPLOYEE_ANALYSIS_SHEET,
    REVENUE_ANALYSIS_SHEET, ReportRow, RowStyle, SHARED_SERVICES_SHEET, SheetTable,
};

/// P&L Summary lines repeated at the bottom of the revenue sheet.
const PL_SUMMARY_LINES: [&str; 5] = [
    "Revenue",
    "HC Expense (W2)",
    "Non HC Expense - TOTAL",
    "Expense",
    "Margin",
];

pub(super) fn revenue_analysis(report: &AnalysisReport) -> SheetTable {
    let mut table = SheetTable::new(
        REVENUE_ANALYSIS_SHEET,
        &["Revenue Stream", "Amount", "% of Total", "Line Items", "Avg per Item"],
    );
    let revenue = report.revenue;

    let mut total_amount = 0.0;
    let mut total_items = 0;
    for stream in report.streams_by_amount() {
        table.push(ReportRow::data(vec![
            CellValue::text(&stream.name),
            CellValue::Currency(stream.total),
            CellValue::Percent(revenue.share_of(stream.total)),
            CellValue::Count(stream.count as f64),
            CellValue::Currency(stream.average()),
        ]));
        total_amount += stream.total;
        total_items += stream.count;
    }
    table.push(ReportRow::total(vec![
        CellValue::text("TOTAL REVENUE"),
        CellValue::Currency(total_amount),
        CellValue::Percent(revenue.share_of(total_amount)),
        CellValue::Count(total_items as f64),
        CellValue::Empty,
    ]));

    table.push(ReportRow::blank());
    table.push(ReportRow::note("Key Observations:", ""));
    for stream in &report.revenue_streams {
        table.push(ReportRow::note(
            "",
            format!(
                "{} revenue is {} of total across {} line items.",
                stream.name,
                percent(revenue.share_of(stream.total), 0),
                stream.count
            ),
        ));
    }

    table.push(ReportRow::blank());
    table.push(ReportRow::new(
        RowStyle::SectionHeader,
        vec![
            CellValue::text("P&L Summary"),
            CellValue::text("Amount"),
            CellValue::text("% of Revenue"),
        ],
    ));
    for label in PL_SUMMARY_LINES {
        let value = report.pl_summary.get(label).unwrap_or(0.0);
        table.push(ReportRow::data(vec![
            CellValue::text(label),
            CellValue::Currency(value),
            CellValue::Percent(revenue.share_of(value)),
        ]));
    }

    table
}

pub(super) fn benchmark_mapping(report: &AnalysisReport) -> SheetTable {
    let mut table = SheetTable::new(
        BENCHMARK_MAPPING_SHEET,
        &[
            "Benchmark Category",
            "HC Cost",
            "Non-HC Cost",
            "Total Cost",
            "% of Revenue",
            "Benchmark Target",
            "Variance",
            "Status",
        ],
    );
    let comparison = &report.comparison;

    for line in &comparison.lines {
        table.push(ReportRow::data(vec![
            CellValue::text(line.category.label()),
            CellValue::Currency(line.headcount),
            CellValue::Currency(line.non_headcount),
            CellValue::Currency(line.total),
            CellValue::Percent(line.share_of_revenue),
            CellValue::Percent(line.target),
            CellValue::Percent(line.variance),
            CellValue::text(line.status.label()),
        ]));
    }
    table.push(ReportRow::total(vec![
        CellValue::text("TOTAL"),
        CellValue::Currency(comparison.total_headcount),
        CellValue::Currency(comparison.total_non_headcount),
        CellValue::Currency(comparison.total()),
        CellValue::Percent(comparison.share_of_revenue()),
        comparison
            .expense_target
            .map(CellValue::Percent)
            .unwrap_or(CellValue::Empty),
    ]));

    table.push(ReportRow::blank());
    table.push(ReportRow::note("Revenue:", money(report.revenue.amount())));
    if let Some(margin) = report.margin_target {
        table.push(ReportRow::note("Margin Target:", percent(margin, 0)));
    }
    if let Some(margin) = report.actual_margin() {
        table.push(ReportRow::note("Actual Margin:", percent(margin, 2)));
    }

    table
}

pub(super) fn shared_services_breakdown(report: &AnalysisReport) -> SheetTable {
    let breakdown = &report.breakdown;
    let revenue = report.revenue;
    let department_column = format!("{} Sub-Department", breakdown.function_group);
    let mut table = SheetTable::new(
        SHARED_SERVICES_SHEET,
        &[
            department_column.as_str(),
            "Employee Count",
            "HC Cost",
            "Non-HC Cost",
            "Total Cost",
            "% of Revenue",
        ],
    );

    for line in &breakdown.lines {
        let style = if line.department == report.focus_department {
            RowStyle::Highlight
        } else {
            RowStyle::Data
        };
        table.push(ReportRow::new(
            style,
            vec![
                CellValue::text(&line.department),
                CellValue::Count(line.employees as f64),
                CellValue::Currency(line.headcount),
                CellValue::Currency(line.non_headcount),
                CellValue::Currency(line.total()),
                CellValue::Percent(revenue.share_of(line.total())),
            ],
        ));
    }
    table.push(ReportRow::total(vec![
        CellValue::text(format!("TOTAL {} (Shared Services)", breakdown.function_group)),
        CellValue::Count(breakdown.employees() as f64),
        CellValue::Currency(breakdown.headcount()),
        CellValue::Currency(breakdown.non_headcount()),
        CellValue::Currency(breakdown.total()),
        CellValue::Percent(revenue.share_of(breakdown.total())),
    ]));

    let focus_total = report.focus_total();
    let focus_share = revenue.share_of(focus_total);
    table.push(ReportRow::blank());
    table.push(ReportRow::note(
        "Shared Services Benchmark:",
        format!("{} of revenue", percent(report.shared_services_target, 1)),
    ));
    table.push(ReportRow::note(
        format!("{} alone:", report.focus_department),
        format!("{} ({} of revenue)", money(focus_total), percent(focus_share, 1)),
    ));
    if focus_share > report.shared_services_target {
        table.push(ReportRow::note(
            "Finding:",
            format!(
                "{} alone exceeds the entire Shared Services benchmark",
                report.focus_department
            ),
        ));
    }

    table
}

pub(super) fn deep_dive(report: &AnalysisReport) -> SheetTable {
    let model = &report.cost_model;
    let revenue = report.revenue;
    let current_total = model.current.total();
    let share_of_current = |amount: f64| {
        if current_total == 0.0 {
            0.0
        } else {
            amount / current_total
        }
    };

    let mut table = SheetTable::new(
        DEEP_DIVE_SHEET,
        &["Cost Component", "Amount", "% of Total", "% of Revenue"],
    );
    table.push(ReportRow::new(
        RowStyle::Highlight,
        vec![
            CellValue::text(format!("Employee Headcount ({} staff)", model.current.headcount)),
            CellValue::Currency(model.current.headcount_cost),
            CellValue::Percent(share_of_current(model.current.headcount_cost)),
            CellValue::Percent(revenue.share_of(model.current.headcount_cost)),
        ],
    ));
    for line in model.current.breakdown_by_amount() {
        table.push(ReportRow::data(vec![
            CellValue::text(format!("  {}", line.category)),
            CellValue::Currency(line.amount),
            CellValue::Percent(share_of_current(line.amount)),
            CellValue::Percent(revenue.share_of(line.amount)),
        ]));
    }
    table.push(ReportRow::total(vec![
        CellValue::text(format!("TOTAL {}", report.focus_department)),
        CellValue::Currency(current_total),
        CellValue::Percent(if current_total == 0.0 { 0.0 } else { 1.0 }),
        CellValue::Percent(revenue.share_of(current_total)),
    ]));

    table.push(ReportRow::blank());
    table.push(ReportRow::new(
        RowStyle::SectionHeader,
        vec![
            CellValue::text("Central Finance Model"),
            CellValue::text("Headcount"),
            CellValue::text("Cost per Role"),
            CellValue::text("Total Cost"),
        ],
    ));
    for role in &model.target.roles {
        table.push(ReportRow::data(vec![
            CellValue::text(&role.name),
            CellValue::count(role.count),
            CellValue::Currency(role.annual),
            CellValue::Currency(role.total_cost()),
        ]));
    }
    table.push(ReportRow::data(vec![
        CellValue::text("Statutory Audit (retained)"),
        CellValue::Empty,
        CellValue::Empty,
        CellValue::Currency(model.target.statutory_audit),
    ]));
    table.push(ReportRow::total(vec![
        CellValue::text("TOTAL IN-MODEL COST"),
        CellValue::count(model.target.headcount()),
        CellValue::Empty,
        CellValue::Currency(model.target.total()),
    ]));

    let savings = &model.savings;
    table.push(ReportRow::blank());
    table.push(ReportRow::data(vec![
        CellValue::text("Current Cost"),
        CellValue::Currency(savings.current_total),
    ]));
    table.push(ReportRow::data(vec![
        CellValue::text("Target In-Model Cost"),
        CellValue::Currency(savings.target_total),
    ]));
    table.push(ReportRow::total(vec![
        CellValue::text("ANNUAL SAVINGS"),
        CellValue::Currency(savings.savings),
    ]));
    table.push(ReportRow::data(vec![
        CellValue::text("Reduction"),
        CellValue::Percent(savings.savings_share),
    ]));

    table
}

pub(super) fn employee_analysis(report: &AnalysisReport) -> SheetTable {
    let mut table = SheetTable::new(
        EMPLOYEE_ANALYSIS_SHEET,
        &[
            "Employee #",
            "Current Salary",
            "Salary Band",
            "Target Central Finance Role",
            "Target Salary",
            "Delta",
        ],
    );

    let assignments = &report.cost_model.assignments;
    for (index, assignment) in assignments.iter().enumerate() {
        table.push(ReportRow::data(vec![
            CellValue::Count((index + 1) as f64),
            CellValue::Currency(assignment.current_salary),
            CellValue::text(&assignment.band),
            CellValue::text(&assignment.target_role),
            CellValue::Currency(assignment.target_salary),
            CellValue::Currency(assignment.delta()),
        ]));
    }

    let total_current: f64 = assignments.iter().map(|assignment| assignment.current_salary).sum();
    let total_target: f64 = assignments.iter().map(|assignment| assignment.target_salary).sum();
    table.push(ReportRow::total(vec![
        CellValue::text("TOTAL"),
        CellValue::Currency(total_current),
        CellValue::Empty,
        CellValue::Empty,
        CellValue::Currency(total_target),
        CellValue::Currency(total_target - total_current),
    ]));

    table.push(ReportRow::blank());
    table.push(ReportRow::note(
        "Note:",
        "Salary bands map onto the Central Finance role catalog. \
         Actual placement requires a skills assessment.",
    ));

    table
}
