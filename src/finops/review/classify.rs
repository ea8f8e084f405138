//! Rule-based mapping of expense lines onto benchmark categories.

use crate::finops::review::model::{BenchmarkCategory, ExpenseRow};

const GENERAL_AND_ADMIN: &str = "G&A";
const SALES_AND_MARKETING: &str = "S&M";
const RESEARCH_AND_DEVELOPMENT: &str = "R&D";
const COST_OF_PRODUCT: &str = "Cost of Product";
const COST_OF_PSO: &str = "Cost of PSO";

const EXECUTIVE_DEPARTMENTS: [&str; 2] = ["GMs & Office Admins", "Corporate"];
const SUPPORT_DEPARTMENTS: [&str; 2] = ["Technical Support", "Enhanced Support"];
const CLOUD_OPERATIONS: &str = "Cloud Operations";
const HOSTING_CATEGORY: &str = "hosting";
const FUNDED_RESEARCH: &str = "Funded R&D";

/// Maps a (function group, department, sub-category) triple to a benchmark
/// category.
///
/// Inputs are trimmed and otherwise compared exactly, except for the hosting
/// sub-category which ignores case. A missing or blank function group or
/// department yields [`BenchmarkCategory::Unclassified`].
pub fn classify(
    function_group: Option<&str>,
    department: Option<&str>,
    category: Option<&str>,
) -> BenchmarkCategory {
    let function_group = function_group.map(str::trim).filter(|value| !value.is_empty());
    let department = department.map(str::trim).filter(|value| !value.is_empty());
    let (Some(function_group), Some(department)) = (function_group, department) else {
        return BenchmarkCategory::Unclassified;
    };
    let category = category.map(str::trim);

    match function_group {
        GENERAL_AND_ADMIN if EXECUTIVE_DEPARTMENTS.contains(&department) => {
            BenchmarkCategory::ExecutiveTeam
        }
        GENERAL_AND_ADMIN => BenchmarkCategory::SharedServices,
        SALES_AND_MARKETING if department == "Marketing" => BenchmarkCategory::Marketing,
        SALES_AND_MARKETING => BenchmarkCategory::Sales,
        RESEARCH_AND_DEVELOPMENT => BenchmarkCategory::Engineering,
        COST_OF_PRODUCT if SUPPORT_DEPARTMENTS.contains(&department) => {
            BenchmarkCategory::TechnicalSupport
        }
        COST_OF_PRODUCT
            if department == CLOUD_OPERATIONS
                && category.is_some_and(|value| value.eq_ignore_ascii_case(HOSTING_CATEGORY)) =>
        {
            BenchmarkCategory::Hosting
        }
        COST_OF_PRODUCT => BenchmarkCategory::Product,
        COST_OF_PSO if department == FUNDED_RESEARCH => BenchmarkCategory::Engineering,
        COST_OF_PSO => BenchmarkCategory::Product,
        _ => BenchmarkCategory::Unclassified,
    }
}

/// Classifies a loaded expense row.
pub fn classify_row(row: &ExpenseRow) -> BenchmarkCategory {
    classify(row.function_group(), row.department(), row.category())
}
