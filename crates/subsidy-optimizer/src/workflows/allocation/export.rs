use super::domain::SelectionRecord;
use super::report::views::AllocationDocument;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write selections CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode run document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat row of the selected-pairs table, using the upstream column naming.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionRow {
    #[serde(rename = "Selection_Rank")]
    pub selection_rank: usize,
    #[serde(rename = "MSME_ID")]
    pub beneficiary_id: String,
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Category")]
    pub category: &'static str,
    #[serde(rename = "Location_Type")]
    pub location_type: String,
    #[serde(rename = "Scheme_ID")]
    pub scheme_id: String,
    #[serde(rename = "Scheme_Name")]
    pub scheme_name: String,
    #[serde(rename = "Before_Annual_Revenue")]
    pub revenue_before: f64,
    #[serde(rename = "Before_Employees")]
    pub employees_before: u32,
    #[serde(rename = "Subsidy_Applied")]
    pub subsidy: f64,
    #[serde(rename = "New_Jobs_Added")]
    pub new_jobs: u32,
    #[serde(rename = "Projected_Revenue")]
    pub revenue_after: f64,
    #[serde(rename = "Projected_Employees")]
    pub employees_after: u32,
    #[serde(rename = "Revenue_Increase_Pct")]
    pub revenue_increase_pct: f64,
    #[serde(rename = "Employment_Increase_Pct")]
    pub employment_increase_pct: f64,
    #[serde(rename = "Norm_Rev_Score")]
    pub norm_revenue_score: f64,
    #[serde(rename = "Norm_Emp_Score")]
    pub norm_employment_score: f64,
    #[serde(rename = "Composite_Score")]
    pub composite_score: f64,
    #[serde(rename = "Efficiency")]
    pub efficiency: Option<f64>,
    #[serde(rename = "Policy_Alpha")]
    pub alpha: f64,
    #[serde(rename = "Policy_Beta")]
    pub beta: f64,
    #[serde(rename = "Efficiency_Rank")]
    pub efficiency_rank: usize,
    #[serde(rename = "Cumulative_Budget_Used")]
    pub cumulative_budget_used: f64,
    #[serde(rename = "Remaining_Budget")]
    pub remaining_budget: f64,
    #[serde(rename = "Sub_Budget_Category")]
    pub sub_budget_category: Option<&'static str>,
    #[serde(rename = "Sub_Budget_Allocated")]
    pub sub_budget_allocated: Option<f64>,
    #[serde(rename = "Decision_Justification")]
    pub justification: String,
}

impl From<&SelectionRecord> for SelectionRow {
    fn from(record: &SelectionRecord) -> Self {
        let pair = &record.pair;
        let candidate = &pair.candidate;
        Self {
            selection_rank: record.selection_rank,
            beneficiary_id: candidate.beneficiary_id.clone(),
            sector: candidate.sector.clone(),
            category: candidate.category.label(),
            location_type: candidate.location_type.clone(),
            scheme_id: candidate.scheme_id.clone(),
            scheme_name: candidate.scheme_name.clone(),
            revenue_before: candidate.revenue_before,
            employees_before: candidate.employees_before,
            subsidy: candidate.subsidy,
            new_jobs: candidate.new_jobs,
            revenue_after: candidate.revenue_after,
            employees_after: candidate.employees_after,
            revenue_increase_pct: candidate.revenue_increase_pct,
            employment_increase_pct: candidate.employment_increase_pct,
            norm_revenue_score: pair.norm_revenue_score,
            norm_employment_score: pair.norm_employment_score,
            composite_score: pair.composite_score,
            efficiency: pair.efficiency.value(),
            alpha: pair.weights.alpha(),
            beta: pair.weights.beta(),
            efficiency_rank: record.efficiency_rank,
            cumulative_budget_used: record.cumulative_budget_used,
            remaining_budget: record.remaining_budget,
            sub_budget_category: record.sub_budget.map(|tag| tag.category.label()),
            sub_budget_allocated: record.sub_budget.map(|tag| tag.allocated),
            justification: record.justification.clone(),
        }
    }
}

/// Output file locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub results_csv: PathBuf,
    pub report_txt: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: impl AsRef<Path>, prefix: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            results_csv: dir.join(format!("{prefix}optimization_results.csv")),
            report_txt: dir.join(format!("{prefix}optimization_report.txt")),
        }
    }
}

/// Writes the selected-pairs table. An empty selection still writes the header row.
pub fn write_selections_csv<W: Write>(
    writer: W,
    selections: &[SelectionRecord],
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if selections.is_empty() {
        csv_writer.write_record(SELECTION_HEADERS)?;
    }
    for record in selections {
        csv_writer.serialize(SelectionRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_selections_csv_path(
    path: impl AsRef<Path>,
    selections: &[SelectionRecord],
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_selections_csv(BufWriter::new(file), selections)
}

pub fn write_report_text(path: impl AsRef<Path>, text: &str) -> Result<(), ExportError> {
    std::fs::write(path, text)?;
    Ok(())
}

pub fn write_document_json<W: Write>(
    mut writer: W,
    document: &AllocationDocument,
) -> Result<(), ExportError> {
    serde_json::to_writer(&mut writer, document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

const SELECTION_HEADERS: [&str; 27] = [
    "Selection_Rank",
    "MSME_ID",
    "Sector",
    "Category",
    "Location_Type",
    "Scheme_ID",
    "Scheme_Name",
    "Before_Annual_Revenue",
    "Before_Employees",
    "Subsidy_Applied",
    "New_Jobs_Added",
    "Projected_Revenue",
    "Projected_Employees",
    "Revenue_Increase_Pct",
    "Employment_Increase_Pct",
    "Norm_Rev_Score",
    "Norm_Emp_Score",
    "Composite_Score",
    "Efficiency",
    "Policy_Alpha",
    "Policy_Beta",
    "Efficiency_Rank",
    "Cumulative_Budget_Used",
    "Remaining_Budget",
    "Sub_Budget_Category",
    "Sub_Budget_Allocated",
    "Decision_Justification",
];
