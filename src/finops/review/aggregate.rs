//! Cost rollups: per benchmark category and per department.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::finops::review::classify::classify_row;
use crate::finops::review::model::{
    BenchmarkCategory, BenchmarkTargets, ExpenseRow, Revenue, SourceData,
};

/// Variance band, as a ratio of revenue, inside which a category is
/// considered on target.
pub const VARIANCE_TOLERANCE: f64 = 0.001;

/// Amount a row contributes to a rollup, or `None` when the row is skipped
/// for a missing department or a missing/non-finite amount.
pub fn counted_amount(row: &ExpenseRow) -> Option<f64> {
    row.department()?;
    row.amount.filter(|amount| amount.is_finite())
}

/// Sums counted amounts per benchmark category.
pub fn sum_by_category<'a, I>(rows: I) -> BTreeMap<BenchmarkCategory, f64>
where
    I: IntoIterator<Item = &'a ExpenseRow>,
{
    let mut totals = BTreeMap::new();
    for row in rows {
        let Some(amount) = counted_amount(row) else {
            continue;
        };
        *totals.entry(classify_row(row)).or_insert(0.0) += amount;
    }
    totals
}

/// Headcount and non-headcount cost per benchmark category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub headcount: BTreeMap<BenchmarkCategory, f64>,
    pub non_headcount: BTreeMap<BenchmarkCategory, f64>,
}

impl CategoryTotals {
    /// Rolls up employee rows as headcount cost and OPEX plus COGS rows as
    /// non-headcount cost.
    pub fn from_source(source: &SourceData) -> Self {
        Self {
            headcount: sum_by_category(&source.employees),
            non_headcount: sum_by_category(source.opex.iter().chain(&source.cogs)),
        }
    }

    pub fn headcount(&self, category: BenchmarkCategory) -> f64 {
        self.headcount.get(&category).copied().unwrap_or(0.0)
    }

    pub fn non_headcount(&self, category: BenchmarkCategory) -> f64 {
        self.non_headcount.get(&category).copied().unwrap_or(0.0)
    }

    pub fn total(&self, category: BenchmarkCategory) -> f64 {
        self.headcount(category) + self.non_headcount(category)
    }

    /// Categories that received at least one counted row.
    pub fn categories(&self) -> BTreeSet<BenchmarkCategory> {
        self.headcount
            .keys()
            .chain(self.non_headcount.keys())
            .copied()
            .collect()
    }

    pub fn grand_total(&self) -> f64 {
        self.headcount.values().chain(self.non_headcount.values()).sum()
    }
}

/// Position of a category against its benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Over,
    Under,
    AtTarget,
}

impl Status {
    pub fn from_variance(variance: f64) -> Self {
        if variance > VARIANCE_TOLERANCE {
            Status::Over
        } else if variance < -VARIANCE_TOLERANCE {
            Status::Under
        } else {
            Status::AtTarget
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Over => "Over",
            Status::Under => "Under",
            Status::AtTarget => "At target",
        }
    }
}

/// One category compared with its benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkLine {
    pub category: BenchmarkCategory,
    pub headcount: f64,
    pub non_headcount: f64,
    pub total: f64,
    pub share_of_revenue: f64,
    pub target: f64,
    pub variance: f64,
    pub status: Status,
}

impl BenchmarkLine {
    /// Amount above (positive) or below target, in currency.
    pub fn gap(&self, revenue: Revenue) -> f64 {
        self.variance * revenue.amount()
    }
}

/// Every costed category compared with its benchmark, plus the totals row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkComparison {
    pub lines: Vec<BenchmarkLine>,
    pub revenue: Revenue,
    pub total_headcount: f64,
    pub total_non_headcount: f64,
    pub expense_target: Option<f64>,
}

impl BenchmarkComparison {
    /// Compares category totals with their targets.
    ///
    /// Rows follow the Benchmarks sheet order; categories with cost but no
    /// benchmark entry follow in label order with a zero target.
    pub fn build(totals: &CategoryTotals, targets: &BenchmarkTargets, revenue: Revenue) -> Self {
        let costed = totals.categories();
        let mut ordered: Vec<BenchmarkCategory> = Vec::new();
        for category in targets.categories() {
            if costed.contains(&category) && !ordered.contains(&category) {
                ordered.push(category);
            }
        }
        let mut remaining: Vec<BenchmarkCategory> = costed
            .iter()
            .copied()
            .filter(|category| !ordered.contains(category))
            .collect();
        remaining.sort_by_key(|category| category.label());
        ordered.extend(remaining);

        let lines = ordered
            .into_iter()
            .map(|category| {
                let total = totals.total(category);
                let share_of_revenue = revenue.share_of(total);
                let target = targets.target_for(category);
                let variance = share_of_revenue - target;
                BenchmarkLine {
                    category,
                    headcount: totals.headcount(category),
                    non_headcount: totals.non_headcount(category),
                    total,
                    share_of_revenue,
                    target,
                    variance,
                    status: Status::from_variance(variance),
                }
            })
            .collect::<Vec<_>>();

        Self {
            total_headcount: lines.iter().map(|line| line.headcount).sum(),
            total_non_headcount: lines.iter().map(|line| line.non_headcount).sum(),
            lines,
            revenue,
            expense_target: targets.expense_total,
        }
    }

    pub fn total(&self) -> f64 {
        self.total_headcount + self.total_non_headcount
    }

    pub fn share_of_revenue(&self) -> f64 {
        self.revenue.share_of(self.total())
    }

    pub fn line(&self, category: BenchmarkCategory) -> Option<&BenchmarkLine> {
        self.lines.iter().find(|line| line.category == category)
    }

    /// Lines ordered by currency gap above target, largest first.
    pub fn largest_gaps(&self) -> Vec<&BenchmarkLine> {
        let mut lines: Vec<&BenchmarkLine> = self.lines.iter().collect();
        lines.sort_by(|lhs, rhs| rhs.variance.total_cmp(&lhs.variance));
        lines
    }
}

/// Cost of one department within a function group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentLine {
    pub department: String,
    pub employees: usize,
    pub headcount: f64,
    pub non_headcount: f64,
}

impl DepartmentLine {
    fn new(department: String) -> Self {
        Self {
            department,
            employees: 0,
            headcount: 0.0,
            non_headcount: 0.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.headcount + self.non_headcount
    }
}

/// Departments of one function group, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DepartmentBreakdown {
    pub function_group: String,
    pub lines: Vec<DepartmentLine>,
}

impl DepartmentBreakdown {
    /// Breaks `function_group` down by department.
    ///
    /// Every employee row in the group counts towards headcount, with a
    /// missing amount treated as zero. OPEX rows only count with an amount.
    pub fn build(employees: &[ExpenseRow], opex: &[ExpenseRow], function_group: &str) -> Self {
        let mut lines: BTreeMap<String, DepartmentLine> = BTreeMap::new();

        for row in employees {
            let Some(department) = department_in_group(row, function_group) else {
                continue;
            };
            let line = lines
                .entry(department.to_string())
                .or_insert_with(|| DepartmentLine::new(department.to_string()));
            line.employees += 1;
            line.headcount += row.amount.filter(|amount| amount.is_finite()).unwrap_or(0.0);
        }

        for row in opex {
            let Some(department) = department_in_group(row, function_group) else {
                continue;
            };
            let Some(amount) = counted_amount(row) else {
                continue;
            };
            lines
                .entry(department.to_string())
                .or_insert_with(|| DepartmentLine::new(department.to_string()))
                .non_headcount += amount;
        }

        Self {
            function_group: function_group.to_string(),
            lines: lines.into_values().collect(),
        }
    }

    pub fn line(&self, department: &str) -> Option<&DepartmentLine> {
        self.lines.iter().find(|line| line.department == department)
    }

    pub fn employees(&self) -> usize {
        self.lines.iter().map(|line| line.employees).sum()
    }

    pub fn headcount(&self) -> f64 {
        self.lines.iter().map(|line| line.headcount).sum()
    }

    pub fn non_headcount(&self) -> f64 {
        self.lines.iter().map(|line| line.non_headcount).sum()
    }

    pub fn total(&self) -> f64 {
        self.headcount() + self.non_headcount()
    }
}

fn department_in_group<'a>(row: &'a ExpenseRow, function_group: &str) -> Option<&'a str> {
    if row.function_group()? != function_group {
        return None;
    }
    row.department()
}
