//! Deep dive narrative rendered from the analysis figures.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::finops::review::aggregate::Status;
use crate::finops::review::config::{NarrativeConfig, NarrativeSection};
use crate::finops::review::error::{Result, ToolError};
use crate::finops::review::report::{AnalysisReport, MARGIN_LABEL};
use crate::finops::review::report::format::{compact_money, money, percent};

pub const PROBLEM_STATEMENT: &str = "Problem Statement";
pub const FIVE_WHY_ANALYSIS: &str = "5 Why Analysis";
pub const ROOT_CAUSE: &str = "Root Cause";
pub const FIX: &str = "Fix";

/// Number of over-target categories named in the gap summary.
const GAP_LEADERS: usize = 4;

/// The filled-in deep dive template: header fields and labelled sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeDocument {
    pub function: String,
    pub playbook_item: String,
    pub sections: Vec<NarrativeSection>,
}

impl NarrativeDocument {
    /// Renders the generated sections followed by the configured ones.
    pub fn build(report: &AnalysisReport, config: &NarrativeConfig) -> Result<Self> {
        let mut sections = vec![
            section(PROBLEM_STATEMENT, problem_statement(report)),
            section(FIVE_WHY_ANALYSIS, five_why_analysis(report)),
            section(ROOT_CAUSE, root_cause(report)),
            section(FIX, fix(report)),
        ];
        sections.extend(config.extra_sections.iter().cloned());

        let document = Self {
            function: config.function.clone(),
            playbook_item: config.playbook_item.clone(),
            sections,
        };
        document.validate()?;
        debug!(sections = document.sections.len(), "narrative rendered");
        Ok(document)
    }

    pub fn section(&self, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|section| section.label == label)
            .map(|section| section.text.as_str())
    }

    /// Rejects sections without text.
    pub fn validate(&self) -> Result<()> {
        match self.sections.iter().find(|section| section.text.trim().is_empty()) {
            Some(empty) => Err(ToolError::InvalidConfig(format!(
                "narrative section '{}' is empty",
                empty.label
            ))),
            None => Ok(()),
        }
    }

    /// Plain text rendering, one block per section.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "Function: {}", self.function);
        let _ = writeln!(text, "Playbook Item: {}", self.playbook_item);
        for section in &self.sections {
            let _ = write!(text, "\n{}\n{}\n{}\n", section.label, "=".repeat(section.label.len()), section.text);
        }
        text
    }
}

fn section(label: &str, text: String) -> NarrativeSection {
    NarrativeSection {
        label: label.to_string(),
        text,
    }
}

fn problem_statement(report: &AnalysisReport) -> String {
    let comparison = &report.comparison;
    let mut text = String::from("What:\n");
    let _ = write!(
        text,
        "This business unit generates {} in revenue",
        compact_money(report.revenue.amount())
    );
    if let (Some(margin), Some(actual)) = (report.pl_summary.get(MARGIN_LABEL), report.actual_margin()) {
        let _ = write!(
            text,
            " but retains only {} ({} margin)",
            compact_money(margin),
            percent(actual, 2)
        );
        if let Some(target) = report.margin_target {
            let _ = write!(text, " versus the {} target", percent(target, 0));
        }
    }
    let _ = write!(
        text,
        ". Expenses consume {} of revenue",
        percent(comparison.share_of_revenue(), 1)
    );
    if let Some(target) = comparison.expense_target {
        let _ = write!(text, " against a {} benchmark", percent(target, 0));
    }
    text.push_str(".\n\nWhy:\n");

    let over: Vec<String> = comparison
        .largest_gaps()
        .into_iter()
        .filter(|line| line.status == Status::Over)
        .map(|line| {
            format!(
                "{} runs at {} vs {}",
                line.category,
                percent(line.share_of_revenue, 1),
                percent(line.target, 1)
            )
        })
        .collect();
    if over.is_empty() {
        text.push_str("No benchmark category is above its target.");
    } else {
        let _ = write!(
            text,
            "{} of {} benchmark categories exceed their target: {}. \
             No function has been restructured around standardized roles or centralized delivery.",
            over.len(),
            comparison.lines.len(),
            over.join(", ")
        );
    }
    text
}

fn five_why_analysis(report: &AnalysisReport) -> String {
    let comparison = &report.comparison;
    let breakdown = &report.breakdown;
    let model = &report.cost_model;
    let revenue = report.revenue;
    let focus = &report.focus_department;
    let focus_total = report.focus_total();

    let over_count = comparison
        .lines
        .iter()
        .filter(|line| line.status == Status::Over)
        .count();
    let gaps: Vec<String> = comparison
        .largest_gaps()
        .into_iter()
        .filter(|line| line.status == Status::Over)
        .take(GAP_LEADERS)
        .map(|line| format!("{} +{}", line.category, compact_money(line.gap(revenue))))
        .collect();

    let mut text = String::new();

    text.push_str("Question 1: Why is this business unit not in model?\n");
    let _ = write!(
        text,
        "Answer: Expenses total {} ({} of revenue) with {} of {} benchmark categories over target.",
        compact_money(comparison.total()),
        percent(comparison.share_of_revenue(), 1),
        over_count,
        comparison.lines.len()
    );
    if !gaps.is_empty() {
        let _ = write!(text, " The largest gaps: {}.", gaps.join(", "));
    }
    text.push_str("\nEvidence: Benchmark Mapping sheet.\n\n");

    let _ = writeln!(text, "Question 2: Why start with Shared Services?");
    let _ = writeln!(
        text,
        "Answer: Shared Services has a predefined Central Finance model with exact roles and rates, \
         so the fix can be specified and its savings quantified. Within Shared Services ({}, {} of revenue, \
         {} employees, {} sub-departments), {} costs {} ({} of revenue) against a Shared Services benchmark of {}.",
        compact_money(breakdown.total()),
        percent(revenue.share_of(breakdown.total()), 1),
        breakdown.employees(),
        breakdown.lines.len(),
        focus,
        compact_money(focus_total),
        percent(revenue.share_of(focus_total), 1),
        percent(report.shared_services_target, 1)
    );
    match report.focus_line() {
        Some(line) => {
            let _ = write!(
                text,
                "Evidence: SS Breakdown sheet. {} highlighted: {} employees, {} headcount, {} non-headcount spend.\n\n",
                focus,
                line.employees,
                compact_money(line.headcount),
                compact_money(line.non_headcount)
            );
        }
        None => text.push_str("Evidence: SS Breakdown sheet.\n\n"),
    }

    let current = &model.current;
    let _ = writeln!(
        text,
        "Question 3: Why does {} cost {}?",
        focus,
        compact_money(current.total())
    );
    let _ = writeln!(
        text,
        "Answer: {} of spend ({}) flows to external providers. The {} internal employees ({}) coordinate \
         vendor handoffs rather than executing standardized processes directly.",
        percent(current.outsourced_share(), 0),
        compact_money(current.outsourced_cost),
        current.headcount,
        compact_money(current.headcount_cost)
    );
    let largest: Vec<String> = current
        .breakdown_by_amount()
        .into_iter()
        .take(2)
        .map(|line| format!("{} ({})", line.category, money(line.amount)))
        .collect();
    if largest.is_empty() {
        text.push_str("Evidence: FA Deep Dive sheet.\n\n");
    } else {
        let _ = write!(
            text,
            "Evidence: FA Deep Dive sheet. {} are the largest cost lines.\n\n",
            largest.join(" and ")
        );
    }

    let _ = writeln!(text, "Question 4: Why is so much spend going to external providers?");
    text.push_str(
        "Answer: Each acquired entity kept its own audit firm, tax advisor, and accounting process. \
         Nothing was consolidated: there is no unified chart of accounts, no shared financial platform, \
         and no standardized close.\n",
    );
    text.push_str("Evidence: OPEX line items show multiple audit and accounting vendors.\n\n");

    let _ = writeln!(text, "Question 5: Why do these fragmented processes persist?");
    text.push_str(
        "Answer: No one was tasked with operational integration. Without a mandate to move onto \
         Central Finance roles, each entity continued to operate independently.\n",
    );
    let salaries = &model.assignments;
    let lowest_paid = salaries
        .iter()
        .rev()
        .find(|assignment| assignment.current_salary > 0.0);
    match (lowest_paid, salaries.first()) {
        (Some(lowest), Some(highest)) => {
            let _ = write!(
                text,
                "Evidence: salaries range from {} to {} with no alignment to Central Finance role tiers. \
                 FA Employee Analysis sheet shows the mapping gap.",
                compact_money(lowest.current_salary),
                compact_money(highest.current_salary)
            );
        }
        _ => text.push_str("Evidence: FA Employee Analysis sheet."),
    }

    text
}

fn root_cause(report: &AnalysisReport) -> String {
    let current = &report.cost_model.current;
    let focus = &report.focus_department;
    let focus_share = report.revenue.share_of(report.focus_total());

    let mut text = format!(
        "No one was tasked with integrating {focus} into the Central Finance model.\n\n\
         The function operates as a fragmented multi-entity operation where {} of cost ({}) flows to \
         external providers, and {} internal staff coordinate vendor handoffs rather than executing \
         standardized processes.\n\n",
        percent(current.outsourced_share(), 0),
        compact_money(current.outsourced_cost),
        current.headcount
    );
    let _ = write!(
        text,
        "At {} ({} of revenue), {focus} ",
        compact_money(report.focus_total()),
        percent(focus_share, 1)
    );
    if focus_share > report.shared_services_target {
        let _ = write!(
            text,
            "alone exceeds the entire Shared Services benchmark of {}.",
            percent(report.shared_services_target, 1)
        );
    } else {
        let _ = write!(
            text,
            "sits within the Shared Services benchmark of {}.",
            percent(report.shared_services_target, 1)
        );
    }
    text.push_str(" The Central Finance roles define the target. The gap is execution.");
    text
}

fn fix(report: &AnalysisReport) -> String {
    let model = &report.cost_model;
    let target = &model.target;
    let savings = &model.savings;

    let mut text = format!(
        "Simplify {} first, then move to the Central Finance model.\n\n",
        report.focus_department
    );
    let _ = writeln!(
        text,
        "Target Central Finance Team ({} roles, standardized):",
        target.headcount()
    );
    for role in &target.roles {
        let _ = writeln!(
            text,
            "  {}x {}: {}/year",
            role.count,
            role.name,
            money(role.total_cost())
        );
    }
    let _ = writeln!(
        text,
        "  Statutory audit (retained): {}/year",
        money(target.statutory_audit)
    );
    let _ = writeln!(text, "  Total in-model cost: {}/year\n", money(target.total()));

    text.push_str("Cost Bridge:\n");
    let _ = writeln!(text, "  Current cost: {}", money(savings.current_total));
    let _ = writeln!(text, "  Target in-model cost: {}", money(savings.target_total));
    let _ = writeln!(
        text,
        "  Annual savings: {} ({} reduction)",
        money(savings.savings),
        percent(savings.savings_share, 0)
    );
    let _ = writeln!(
        text,
        "  Margin impact: +{} of revenue\n",
        percent(report.revenue.share_of(savings.savings), 1)
    );

    text.push_str("Phased Implementation:\n");
    text.push_str("Phase 1: Simplify and document (weeks 1 to 4)\n");
    let _ = writeln!(
        text,
        "  Freeze new outsourced engagements. Map each of {} employees to a Central Finance role tier.",
        savings.current_headcount
    );
    text.push_str("Phase 2: Migrate to Central (weeks 5 to 12)\n");
    text.push_str("  Migrate the chart of accounts, consolidate audit firms, and bring outsourced work in house.\n");
    text.push_str("Phase 3: Optimization (weeks 13 to 16)\n");
    let _ = write!(
        text,
        "  Run the first full close on the Central Finance model. KPI: run rate under {}.",
        compact_money(target.total())
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finops::review::report::tests::sample_report;

    fn document() -> NarrativeDocument {
        NarrativeDocument::build(&sample_report(), &NarrativeConfig::default()).expect("narrative built")
    }

    #[test]
    fn sections_follow_template_order() {
        let labels: Vec<String> = document()
            .sections
            .into_iter()
            .map(|section| section.label)
            .collect();
        assert_eq!(
            labels,
            vec![
                PROBLEM_STATEMENT,
                FIVE_WHY_ANALYSIS,
                ROOT_CAUSE,
                FIX,
                "AI Opportunities",
                "AI Tools Used",
            ]
        );
    }

    #[test]
    fn problem_statement_quotes_revenue_and_margin() {
        let document = document();
        let text = document.section(PROBLEM_STATEMENT).expect("problem statement");
        assert!(text.starts_with("What:\n"));
        assert!(text.contains("$10K in revenue"));
        assert!(text.contains("(40.00% margin) versus the 70% target"));
        assert!(text.contains("Expenses consume 34.0% of revenue against a 30% benchmark"));
        assert!(text.contains("Shared Services runs at 9.5% vs 4.5%"));
    }

    #[test]
    fn five_why_has_five_questions() {
        let document = document();
        let text = document.section(FIVE_WHY_ANALYSIS).expect("five why");
        for question in 1..=5 {
            assert!(text.contains(&format!("Question {question}:")));
        }
        assert!(text.contains("Finance & Accounting highlighted: 2 employees"));
        assert!(text.contains("salaries range from $35K to $176K"));
    }

    #[test]
    fn fix_lists_team_and_bridge() {
        let document = document();
        let text = document.section(FIX).expect("fix");
        assert!(text.contains("  10x Accountant: $300,000/year"));
        assert!(text.contains("  Total in-model cost: $1,200,000/year"));
        assert!(text.contains("  Annual savings: $2,622,076 (69% reduction)"));
    }

    #[test]
    fn empty_extra_section_is_rejected() {
        let mut config = NarrativeConfig::default();
        config.extra_sections.push(NarrativeSection {
            label: "Appendix".into(),
            text: "  ".into(),
        });
        let error = NarrativeDocument::build(&sample_report(), &config).expect_err("empty section");
        assert!(matches!(error, ToolError::InvalidConfig(_)));
    }

    #[test]
    fn text_rendering_includes_header_and_sections() {
        let text = document().to_text();
        assert!(text.starts_with("Function: Operations\nPlaybook Item: Initial Import\n"));
        assert!(text.contains("\nRoot Cause\n==========\n"));
    }
}
