use std::path::Path;

use tracing::{debug, info, instrument};

use crate::finops::review::config::AnalysisConfig;
use crate::finops::review::cost_model::CostModel;
use crate::finops::review::error::{Result, ToolError};
use crate::finops::review::io::{excel_read, excel_write, narrative_write};
use crate::finops::review::model::SourceData;
use crate::finops::review::narrative::NarrativeDocument;
use crate::finops::review::report::AnalysisReport;

/// Loads the input P&L workbook.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn load_source(input: &Path) -> Result<SourceData> {
    if !input.exists() {
        return Err(ToolError::MissingInput(input.to_path_buf()));
    }
    let source = excel_read::read_source(input)?;
    info!(
        employees = source.employees.len(),
        opex = source.opex.len(),
        cogs = source.cogs.len(),
        streams = source.revenue_streams.len(),
        "read source workbook"
    );
    Ok(source)
}

/// Builds the analysis workbook from an input P&L workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn analyze_workbook(input: &Path, output: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let source = load_source(input)?;
    let report = AnalysisReport::build(&source, config)?;
    let workbook = report.workbook();
    debug!(sheet_count = workbook.tables.len(), "workbook constructed");
    excel_write::write_workbook(output, &workbook)?;
    info!("analysis workbook written");
    Ok(report)
}

/// Renders the deep dive narrative from an input P&L workbook. The JSON
/// document is always written; the plain text copy only when `text` is set.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn generate_narrative(
    input: &Path,
    output: &Path,
    text: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<NarrativeDocument> {
    let source = load_source(input)?;
    let report = AnalysisReport::build(&source, config)?;
    let document = NarrativeDocument::build(&report, &config.narrative)?;
    narrative_write::write_json(output, &document)?;
    if let Some(text_path) = text {
        narrative_write::write_text(text_path, &document)?;
        debug!(text = %text_path.display(), "plain text narrative written");
    }
    info!(sections = document.sections.len(), "narrative written");
    Ok(document)
}

/// Builds the cost model on its own; it depends only on the configuration.
#[instrument(level = "debug", skip_all)]
pub fn cost_model(config: &AnalysisConfig) -> Result<CostModel> {
    config.validate()?;
    CostModel::build(config)
}
