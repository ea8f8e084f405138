use std::fmt;

use serde::{Deserialize, Serialize};

use crate::finops::review::error::{Result, ToolError};

/// Label of the P&L Summary line holding total revenue.
pub const REVENUE_LABEL: &str = "Revenue";

/// Standardized cost bucket with an industry target percent of revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BenchmarkCategory {
    #[serde(rename = "Shared Services")]
    SharedServices,
    #[serde(rename = "Executive Team")]
    ExecutiveTeam,
    Sales,
    Marketing,
    #[serde(rename = "Technical Support")]
    TechnicalSupport,
    Hosting,
    Product,
    Engineering,
    Unclassified,
}

impl BenchmarkCategory {
    /// Every category, in declaration order.
    pub const ALL: [BenchmarkCategory; 9] = [
        BenchmarkCategory::SharedServices,
        BenchmarkCategory::ExecutiveTeam,
        BenchmarkCategory::Sales,
        BenchmarkCategory::Marketing,
        BenchmarkCategory::TechnicalSupport,
        BenchmarkCategory::Hosting,
        BenchmarkCategory::Product,
        BenchmarkCategory::Engineering,
        BenchmarkCategory::Unclassified,
    ];

    /// Human readable label, as it appears in the Benchmarks sheet.
    pub fn label(self) -> &'static str {
        match self {
            BenchmarkCategory::SharedServices => "Shared Services",
            BenchmarkCategory::ExecutiveTeam => "Executive Team",
            BenchmarkCategory::Sales => "Sales",
            BenchmarkCategory::Marketing => "Marketing",
            BenchmarkCategory::TechnicalSupport => "Technical Support",
            BenchmarkCategory::Hosting => "Hosting",
            BenchmarkCategory::Product => "Product",
            BenchmarkCategory::Engineering => "Engineering",
            BenchmarkCategory::Unclassified => "Unclassified",
        }
    }

    /// Parses a label back into a category. Matching is exact after trimming.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|category| category.label() == label)
    }
}

impl fmt::Display for BenchmarkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single cost line read from the employee, OPEX, or COGS tables.
///
/// Every field is optional because the source sheets are free-form: the
/// aggregator decides which rows count, the loader never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRow {
    /// Function group (Function L2), e.g. `G&A` or `Cost of Product`.
    pub function_group: Option<String>,
    /// Department within the function group.
    pub department: Option<String>,
    /// Expense sub-category. Only non-employee rows carry one.
    pub category: Option<String>,
    /// Annual amount. `None` when the cell was empty or not numeric.
    pub amount: Option<f64>,
}

impl ExpenseRow {
    /// Creates a fully populated row without a sub-category.
    pub fn new(function_group: impl Into<String>, department: impl Into<String>, amount: f64) -> Self {
        Self {
            function_group: Some(function_group.into()),
            department: Some(department.into()),
            category: None,
            amount: Some(amount),
        }
    }

    /// Sets the expense sub-category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Trimmed function group, `None` when absent or blank.
    pub fn function_group(&self) -> Option<&str> {
        non_blank(self.function_group.as_deref())
    }

    /// Trimmed department, `None` when absent or blank.
    pub fn department(&self) -> Option<&str> {
        non_blank(self.department.as_deref())
    }

    /// Trimmed sub-category, `None` when absent or blank.
    pub fn category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Total revenue. Construction guarantees a finite, strictly positive amount
/// so that percent of revenue never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Revenue(f64);

impl Revenue {
    pub fn new(amount: f64) -> Result<Self> {
        if amount.is_finite() && amount > 0.0 {
            Ok(Self(amount))
        } else {
            Err(ToolError::NonPositiveRevenue(amount))
        }
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    /// Ratio of `amount` to revenue.
    pub fn share_of(self, amount: f64) -> f64 {
        amount / self.0
    }
}

/// Revenue aggregated from one of the revenue detail sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueStream {
    pub name: String,
    pub total: f64,
    pub count: usize,
}

impl RevenueStream {
    /// Average amount per line item, zero when the stream is empty.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// A role in an operating model: either a current-state bucket or a slot in
/// the target team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "role")]
    pub name: String,
    pub count: u32,
    pub annual: f64,
}

impl Role {
    pub fn new(name: impl Into<String>, count: u32, annual: f64) -> Self {
        Self {
            name: name.into(),
            count,
            annual,
        }
    }

    /// Combined annual cost of every seat in this role.
    pub fn total_cost(&self) -> f64 {
        f64::from(self.count) * self.annual
    }
}

/// Target ratios read from the Benchmarks sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchmarkTargets {
    /// Category targets in sheet order.
    pub entries: Vec<(BenchmarkCategory, f64)>,
    /// Target margin, from the `Margin` row.
    pub margin: Option<f64>,
    /// Target total expense ratio, from the `Expense Total` row.
    pub expense_total: Option<f64>,
}

impl BenchmarkTargets {
    /// Target ratio for `category`, zero when the sheet does not list it.
    pub fn target_for(&self, category: BenchmarkCategory) -> f64 {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == category)
            .map(|(_, target)| *target)
            .unwrap_or(0.0)
    }

    /// Records the target for `category`. A repeated category keeps its first
    /// position and takes the latest target.
    pub fn set(&mut self, category: BenchmarkCategory, target: f64) {
        match self.entries.iter_mut().find(|(candidate, _)| *candidate == category) {
            Some(entry) => entry.1 = target,
            None => self.entries.push((category, target)),
        }
    }

    /// Categories in sheet order.
    pub fn categories(&self) -> impl Iterator<Item = BenchmarkCategory> + '_ {
        self.entries.iter().map(|(category, _)| *category)
    }
}

/// Labelled lines of the P&L Summary sheet, in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlSummary {
    pub lines: Vec<(String, f64)>,
}

impl PlSummary {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.lines
            .iter()
            .find(|(candidate, _)| candidate == label)
            .map(|(_, value)| *value)
    }
}

/// Everything loaded from the input workbook. Built once by the loader and
/// handed by reference to every later stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceData {
    pub benchmarks: BenchmarkTargets,
    pub pl_summary: PlSummary,
    pub revenue_streams: Vec<RevenueStream>,
    pub employees: Vec<ExpenseRow>,
    pub opex: Vec<ExpenseRow>,
    pub cogs: Vec<ExpenseRow>,
}

impl SourceData {
    /// Total revenue from the P&L Summary.
    pub fn revenue(&self) -> Result<Revenue> {
        let amount = self.pl_summary.get(REVENUE_LABEL).unwrap_or(0.0);
        Revenue::new(amount)
    }

    /// Looks up a revenue stream by name.
    pub fn stream(&self, name: &str) -> Option<&RevenueStream> {
        self.revenue_streams.iter().find(|stream| stream.name == name)
    }
}
