//! Transition of the current Finance & Accounting cost structure onto the
//! Central Finance operating model.

use serde::Serialize;

use crate::finops::review::config::{AnalysisConfig, OpexLine, SalaryBand};
use crate::finops::review::error::{Result, ToolError};
use crate::finops::review::model::Role;

/// Current cost of the function: salaries plus vendor and operating spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentCost {
    pub headcount: usize,
    pub headcount_cost: f64,
    pub non_headcount_cost: f64,
    pub non_headcount_breakdown: Vec<OpexLine>,
    pub outsourced_cost: f64,
}

impl CurrentCost {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let outsourced_cost = config
            .current_opex
            .iter()
            .filter(|line| config.outsourced_categories.contains(&line.category))
            .map(|line| line.amount)
            .sum();
        Self {
            headcount: config.current_salaries.len(),
            headcount_cost: config.current_salaries.iter().sum(),
            non_headcount_cost: config.current_opex.iter().map(|line| line.amount).sum(),
            non_headcount_breakdown: config.current_opex.clone(),
            outsourced_cost,
        }
    }

    pub fn total(&self) -> f64 {
        self.headcount_cost + self.non_headcount_cost
    }

    /// Share of the total flowing to outsourced providers.
    pub fn outsourced_share(&self) -> f64 {
        ratio(self.outsourced_cost, self.total())
    }

    /// Non-headcount lines, largest amount first.
    pub fn breakdown_by_amount(&self) -> Vec<&OpexLine> {
        let mut lines: Vec<&OpexLine> = self.non_headcount_breakdown.iter().collect();
        lines.sort_by(|lhs, rhs| rhs.amount.total_cmp(&lhs.amount));
        lines
    }
}

/// Proposed Central Finance team plus the retained external audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetModel {
    pub roles: Vec<Role>,
    pub statutory_audit: f64,
}

impl TargetModel {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            roles: config.target_team.clone(),
            statutory_audit: config.statutory_audit,
        }
    }

    pub fn team_cost(&self) -> f64 {
        self.roles.iter().map(Role::total_cost).sum()
    }

    pub fn total(&self) -> f64 {
        self.team_cost() + self.statutory_audit
    }

    pub fn headcount(&self) -> u32 {
        self.roles.iter().map(|role| role.count).sum()
    }
}

/// Where one current employee lands in the target model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleAssignment {
    pub current_salary: f64,
    pub band: String,
    pub target_role: String,
    pub target_salary: f64,
}

impl RoleAssignment {
    /// Target minus current salary.
    pub fn delta(&self) -> f64 {
        self.target_salary - self.current_salary
    }
}

/// Picks the band for `salary`: the highest threshold the salary reaches,
/// or the lowest band when it reaches none. `None` only for an empty table.
pub fn band_for(salary: f64, bands: &[SalaryBand]) -> Option<&SalaryBand> {
    let mut ordered: Vec<&SalaryBand> = bands.iter().collect();
    ordered.sort_by(|lhs, rhs| rhs.min_salary.total_cmp(&lhs.min_salary));
    ordered
        .iter()
        .find(|band| salary >= band.min_salary)
        .or_else(|| ordered.last())
        .copied()
}

/// Maps every current salary to a central role, highest salary first.
pub fn map_employees(config: &AnalysisConfig) -> Result<Vec<RoleAssignment>> {
    let mut salaries = config.current_salaries.clone();
    salaries.sort_by(|lhs, rhs| rhs.total_cmp(lhs));

    salaries
        .into_iter()
        .map(|salary| {
            let band = band_for(salary, &config.salary_bands).ok_or_else(|| {
                ToolError::InvalidConfig("at least one salary band is required".into())
            })?;
            let role = config.central_role(&band.role).ok_or_else(|| {
                ToolError::InvalidConfig(format!("unknown central role '{}'", band.role))
            })?;
            Ok(RoleAssignment {
                current_salary: salary,
                band: band.label.clone(),
                target_role: role.name.clone(),
                target_salary: role.annual,
            })
        })
        .collect()
}

/// Bridge between current and target cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsSummary {
    pub current_total: f64,
    pub target_total: f64,
    pub savings: f64,
    pub savings_share: f64,
    pub current_headcount: usize,
    pub target_headcount: u32,
}

impl SavingsSummary {
    pub fn between(current: &CurrentCost, target: &TargetModel) -> Self {
        let current_total = current.total();
        let target_total = target.total();
        let savings = current_total - target_total;
        Self {
            current_total,
            target_total,
            savings,
            savings_share: ratio(savings, current_total),
            current_headcount: current.headcount,
            target_headcount: target.headcount(),
        }
    }
}

/// Complete before/after model for the focus department.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostModel {
    pub current: CurrentCost,
    pub target: TargetModel,
    pub assignments: Vec<RoleAssignment>,
    pub savings: SavingsSummary,
}

impl CostModel {
    pub fn build(config: &AnalysisConfig) -> Result<Self> {
        let current = CurrentCost::from_config(config);
        let target = TargetModel::from_config(config);
        let assignments = map_employees(config)?;
        let savings = SavingsSummary::between(&current, &target);
        Ok(Self {
            current,
            target,
            assignments,
            savings,
        })
    }
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole }
}
