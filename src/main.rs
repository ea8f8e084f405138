use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use finops_review::config::AnalysisConfig;
use finops_review::report::format::{money, percent};
use finops_review::{Result, ToolError, logging, pipeline};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(&cli.log_level)?;
    match cli.command {
        Command::Analyze(args) => execute_analyze(args),
        Command::Narrative(args) => execute_narrative(args),
        Command::CostModel(args) => execute_cost_model(args),
        Command::DefaultConfig(args) => AnalysisConfig::default().save(&args.output),
    }
}

fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    require_input(&args.input)?;
    let config = AnalysisConfig::load_or_default(args.config.as_deref())?;
    pipeline::analyze_workbook(&args.input, &args.output, &config)?;
    Ok(())
}

fn execute_narrative(args: NarrativeArgs) -> Result<()> {
    require_input(&args.input)?;
    let config = AnalysisConfig::load_or_default(args.config.as_deref())?;
    pipeline::generate_narrative(&args.input, &args.output, args.text.as_deref(), &config)?;
    Ok(())
}

fn execute_cost_model(args: CostModelArgs) -> Result<()> {
    let config = AnalysisConfig::load_or_default(args.config.as_deref())?;
    let model = pipeline::cost_model(&config)?;

    println!("=== Current Cost ===");
    println!(
        "  Headcount: {} employees, {}",
        model.current.headcount,
        money(model.current.headcount_cost)
    );
    println!("  Non-HC OPEX: {}", money(model.current.non_headcount_cost));
    println!("  Total: {}", money(model.current.total()));
    println!("  Outsourced: {}", percent(model.current.outsourced_share(), 1));

    println!("\n=== Target Central Finance Model ===");
    for role in &model.target.roles {
        println!("  {}x {}: {}", role.count, role.name, money(role.total_cost()));
    }
    println!("  Statutory Audit: {}", money(model.target.statutory_audit));
    println!(
        "  Total: {} ({} people)",
        money(model.target.total()),
        model.target.headcount()
    );

    println!("\n=== Savings ===");
    println!("  Current: {}", money(model.savings.current_total));
    println!("  Target:  {}", money(model.savings.target_total));
    println!(
        "  Savings: {} ({} reduction)",
        money(model.savings.savings),
        percent(model.savings.savings_share, 0)
    );

    println!("\n=== Employee Role Mapping ===");
    for assignment in &model.assignments {
        println!(
            "  {:>10} -> {:<20} ({})",
            money(assignment.current_salary),
            assignment.target_role,
            money(assignment.target_salary)
        );
    }
    Ok(())
}

fn require_input(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ToolError::MissingInput(path.to_path_buf()))
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Benchmark analysis and Central Finance cost model for an input P&L workbook."
)]
struct Cli {
    /// Default log filter when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the analysis workbook.
    Analyze(AnalyzeArgs),
    /// Write the deep dive narrative.
    Narrative(NarrativeArgs),
    /// Print the Central Finance cost model.
    CostModel(CostModelArgs),
    /// Write the built-in configuration as JSON.
    DefaultConfig(DefaultConfigArgs),
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Input P&L workbook.
    #[arg(long)]
    input: PathBuf,

    /// Output analysis workbook.
    #[arg(long)]
    output: PathBuf,

    /// Optional JSON configuration overriding the built-in tables.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct NarrativeArgs {
    /// Input P&L workbook.
    #[arg(long)]
    input: PathBuf,

    /// Output narrative JSON document.
    #[arg(long)]
    output: PathBuf,

    /// Optional plain text copy of the narrative.
    #[arg(long)]
    text: Option<PathBuf>,

    /// Optional JSON configuration overriding the built-in tables.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CostModelArgs {
    /// Optional JSON configuration overriding the built-in tables.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct DefaultConfigArgs {
    /// Destination file.
    #[arg(long)]
    output: PathBuf,
}
