//! Dataset-specific constants: current F&A cost lines, the Central Finance
//! role catalog, the target team, and narrative settings.
//!
//! [`AnalysisConfig::default`] reproduces the Operational Leadership dataset.
//! A JSON file can override any subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::finops::review::error::{Result, ToolError};
use crate::finops::review::model::Role;

/// One non-headcount cost line of the current F&A function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpexLine {
    pub category: String,
    pub amount: f64,
}

impl OpexLine {
    pub fn new(category: impl Into<String>, amount: f64) -> Self {
        Self {
            category: category.into(),
            amount,
        }
    }
}

/// Standardized Central Finance role with its rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralRole {
    pub name: String,
    pub hourly: f64,
    pub annual: f64,
}

impl CentralRole {
    pub fn new(name: impl Into<String>, hourly: f64, annual: f64) -> Self {
        Self {
            name: name.into(),
            hourly,
            annual,
        }
    }
}

/// Salaries at or above `min_salary` map to `role`, unless a higher band
/// matches first. The lowest band also takes anything below every threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBand {
    pub min_salary: f64,
    pub role: String,
    pub label: String,
}

impl SalaryBand {
    pub fn new(min_salary: f64, role: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            min_salary,
            role: role.into(),
            label: label.into(),
        }
    }
}

/// A fixed narrative block appended after the generated sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub function: String,
    pub playbook_item: String,
    pub extra_sections: Vec<NarrativeSection>,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            function: "Operations".into(),
            playbook_item: "Initial Import".into(),
            extra_sections: vec![
                NarrativeSection {
                    label: "AI Opportunities".into(),
                    text: concat!(
                        "Area 1: Automated Financial Close\n",
                        "Intercompany matching, recurring journal entries and exception review ",
                        "run on the unified general ledger once migration completes. ",
                        "Only true exceptions go to an accountant.\n",
                        "Estimated impact: close cycle below 5 days.\n\n",
                        "Area 2: Spend Intelligence\n",
                        "Vendor spend is classified daily from accounts payable feeds, ",
                        "duplicate payments are flagged, and benchmark breaches are reported weekly.\n",
                        "Estimated impact: prevents cost drift after the structural fix."
                    )
                    .into(),
                },
                NarrativeSection {
                    label: "AI Tools Used".into(),
                    text: concat!(
                        "The input P&L workbook was parsed programmatically. Every expense line ",
                        "was mapped to a benchmark category, and the cost model was built from ",
                        "the Central Finance role catalog.\n\n",
                        "All analysis sheets are regenerated from the source tabs, ",
                        "so every figure in this document is traceable to a source row."
                    )
                    .into(),
                },
            ],
        }
    }
}

/// Constant tables driving the cost model, the breakdown, and the narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Annual cost of every current F&A employee.
    pub current_salaries: Vec<f64>,
    /// Current F&A non-headcount cost by category.
    pub current_opex: Vec<OpexLine>,
    /// OPEX categories counted as outsourced spend.
    pub outsourced_categories: Vec<String>,
    /// Central Finance role catalog.
    pub central_roles: Vec<CentralRole>,
    /// Proposed Central Finance team.
    pub target_team: Vec<Role>,
    /// External audit cost retained in the target model.
    pub statutory_audit: f64,
    /// Salary bands used to map current employees onto central roles.
    pub salary_bands: Vec<SalaryBand>,
    /// Function group broken down by department.
    pub shared_services_group: String,
    /// Department highlighted in the breakdown and modelled by the cost model.
    pub focus_department: String,
    pub narrative: NarrativeConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            current_salaries: vec![
                77_000.0, 91_300.0, 42_500.0, 43_424.0, 88_000.0, 121_000.0, 176_000.0, 41_800.0,
                82_500.0, 60_500.0, 121_000.0, 46_658.0, 0.0, 88_937.0, 82_500.0, 156_200.0,
                35_213.0, 96_140.0,
            ],
            current_opex: vec![
                OpexLine::new("Outsourced Services", 1_426_248.0),
                OpexLine::new("External Contractors", 529_469.0),
                OpexLine::new("Occupancy", 313_683.0),
                OpexLine::new("Hosting", 225_605.0),
                OpexLine::new("Personnel", 197_362.0),
                OpexLine::new("Marketing", 2_209.0),
                OpexLine::new("Commissions", -4_098.0),
                OpexLine::new("T&E/Other", -319_074.0),
            ],
            outsourced_categories: vec![
                "Outsourced Services".into(),
                "External Contractors".into(),
            ],
            central_roles: vec![
                CentralRole::new("SVP of Finance", 200.0, 400_000.0),
                CentralRole::new("VP of Finance", 100.0, 200_000.0),
                CentralRole::new("Finance Manager", 50.0, 100_000.0),
                CentralRole::new("Senior Accountant", 30.0, 60_000.0),
                CentralRole::new("Accountant", 15.0, 30_000.0),
            ],
            target_team: vec![
                Role::new("VP of Finance", 1, 200_000.0),
                Role::new("Finance Manager", 2, 100_000.0),
                Role::new("Senior Accountant", 5, 60_000.0),
                Role::new("Accountant", 10, 30_000.0),
            ],
            statutory_audit: 200_000.0,
            salary_bands: vec![
                SalaryBand::new(150_000.0, "VP of Finance", "$150K+"),
                SalaryBand::new(85_000.0, "Finance Manager", "$85K to $150K"),
                SalaryBand::new(55_000.0, "Senior Accountant", "$55K to $85K"),
                SalaryBand::new(0.0, "Accountant", "Under $55K"),
            ],
            shared_services_group: "G&A".into(),
            focus_department: "Finance & Accounting".into(),
            narrative: NarrativeConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Loads a configuration file, filling omitted fields with defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&source)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded analysis configuration");
        Ok(config)
    }

    /// Loads `path` when given, the defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn central_role(&self, name: &str) -> Option<&CentralRole> {
        self.central_roles.iter().find(|role| role.name == name)
    }

    /// Checks cross references between the tables.
    pub fn validate(&self) -> Result<()> {
        if self.salary_bands.is_empty() {
            return Err(ToolError::InvalidConfig("at least one salary band is required".into()));
        }
        for band in &self.salary_bands {
            if self.central_role(&band.role).is_none() {
                return Err(ToolError::InvalidConfig(format!(
                    "salary band '{}' refers to unknown role '{}'",
                    band.label, band.role
                )));
            }
        }
        for role in &self.target_team {
            if self.central_role(&role.name).is_none() {
                return Err(ToolError::InvalidConfig(format!(
                    "target team refers to unknown role '{}'",
                    role.name
                )));
            }
        }
        if let Some(salary) = self.current_salaries.iter().find(|salary| !salary.is_finite()) {
            return Err(ToolError::InvalidConfig(format!("invalid salary {salary}")));
        }
        if !self.statutory_audit.is_finite() || self.statutory_audit < 0.0 {
            return Err(ToolError::InvalidConfig(format!(
                "statutory audit cost must be a non-negative amount, got {}",
                self.statutory_audit
            )));
        }
        Ok(())
    }
}
