use crate::infra::{build_policy, parse_category_share};
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;
use subsidy_optimizer::config::AppConfig;
use subsidy_optimizer::error::AppError;
use subsidy_optimizer::telemetry;
use subsidy_optimizer::workflows::allocation::export::{
    write_document_json, write_report_text, write_selections_csv_path, OutputPaths,
};
use subsidy_optimizer::workflows::allocation::{render_text, AllocationEngine};
use subsidy_optimizer::workflows::candidates::CandidateImporter;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct OptimizeArgs {
    /// Eligibility results CSV (defaults to OPTIMIZER_CANDIDATES_CSV)
    #[arg(long)]
    pub(crate) candidates: Option<PathBuf>,
    /// Revenue weight in [0, 1]; employment receives 1 - alpha
    #[arg(long)]
    pub(crate) alpha: Option<f64>,
    /// Total subsidy budget in rupees
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) budget: Option<f64>,
    /// Split the budget into Micro/Small/Medium sub-budgets (40/35/25)
    #[arg(long)]
    pub(crate) category_budgets: bool,
    /// Custom sub-budget share as LABEL=SHARE; repeat per category
    #[arg(long = "category-share", value_parser = parse_category_share)]
    pub(crate) category_shares: Vec<(String, f64)>,
    /// Prefix prepended to the output file names
    #[arg(long, default_value = "")]
    pub(crate) output_prefix: String,
    /// Directory for the output files (defaults to OPTIMIZER_OUTPUT_DIR)
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Print one JSON document to stdout instead of writing files
    #[arg(long)]
    pub(crate) json: bool,
    /// Number of ranked selections shown in the text report
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
}

pub(crate) fn run_optimize(args: OptimizeArgs) -> Result<(), AppError> {
    let OptimizeArgs {
        candidates,
        alpha,
        budget,
        category_budgets,
        category_shares,
        output_prefix,
        output_dir,
        json,
        top,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let defaults = &config.optimizer;

    let candidates = candidates.unwrap_or_else(|| defaults.candidates_path.clone());
    let pool = CandidateImporter::from_path(&candidates)?;
    let policy = build_policy(
        alpha.unwrap_or(defaults.default_alpha),
        budget.unwrap_or(defaults.default_budget),
        category_budgets,
        &category_shares,
    )?;

    let run = AllocationEngine::new(policy).run(&pool.pairs)?;
    let generated_at = Utc::now();

    if json {
        let stdout = std::io::stdout();
        write_document_json(stdout.lock(), &run.document(generated_at))?;
        return Ok(());
    }

    let output_dir = output_dir.unwrap_or_else(|| defaults.output_dir.clone());
    std::fs::create_dir_all(&output_dir)?;
    let paths = OutputPaths::new(&output_dir, &output_prefix);

    let text = render_text(&run.report(top, generated_at));
    write_selections_csv_path(&paths.results_csv, run.selections())?;
    write_report_text(&paths.report_txt, &text)?;
    info!(
        results = %paths.results_csv.display(),
        report = %paths.report_txt.display(),
        "optimization outputs written"
    );

    print!("{text}");
    println!("Selections: {}", paths.results_csv.display());
    println!("Report:     {}", paths.report_txt.display());

    Ok(())
}
