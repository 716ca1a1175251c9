mod normalizer;
mod parser;

use crate::workflows::allocation::{BeneficiaryCategory, CandidatePair};
use normalizer::{collapse, SimulationKind};
use parser::{CandidateRow, ParsedRows};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum CandidateImportError {
    #[error("candidate dataset not found at {path}; run the scheme eligibility step first")]
    MissingDataset { path: PathBuf },
    #[error("failed to read candidate dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid candidate CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("candidate dataset has no header row")]
    EmptyDataset,
    #[error("row {row}: Subsidy_Applied is missing")]
    MissingSubsidy { row: usize },
    #[error("row {row}: {column} is missing")]
    MissingValue { row: usize, column: &'static str },
    #[error("row {row}: {column} is not a number: {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: unknown beneficiary category {value:?}")]
    UnknownCategory { row: usize, value: String },
}

/// Eligible pairs read from one dataset, plus what was left out.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    pub pairs: Vec<CandidatePair>,
    pub total_rows: usize,
    /// Rows dropped per simulation kind (e.g. combined multi-scheme rows). Rows whose
    /// kind cell is blank are counted under [`BLANK_SIMULATION_KIND`].
    pub skipped: BTreeMap<String, usize>,
}

impl CandidatePool {
    pub fn skipped_rows(&self) -> usize {
        self.skipped.values().sum()
    }
}

pub const BLANK_SIMULATION_KIND: &str = "(blank)";

pub struct CandidateImporter;

impl CandidateImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<CandidatePool, CandidateImportError> {
        let path = path.as_ref();
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CandidateImportError::MissingDataset {
                    path: path.to_path_buf(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        let pool = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = pool.total_rows,
            eligible = pool.pairs.len(),
            skipped = pool.skipped_rows(),
            "candidate dataset loaded"
        );
        Ok(pool)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<CandidatePool, CandidateImportError> {
        let ParsedRows {
            rows,
            has_simulation_column,
        } = parser::parse_rows(reader)?.ok_or(CandidateImportError::EmptyDataset)?;
        let mut pool = CandidatePool {
            total_rows: rows.len(),
            ..CandidatePool::default()
        };

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            if has_simulation_column {
                let kind = match row.simulation_type.as_deref().map(SimulationKind::parse) {
                    Some(SimulationKind::SingleScheme) => None,
                    Some(SimulationKind::Other(kind)) => Some(kind),
                    None => Some(BLANK_SIMULATION_KIND.to_string()),
                };
                if let Some(kind) = kind {
                    *pool.skipped.entry(kind).or_default() += 1;
                    continue;
                }
            }

            pool.pairs.push(candidate_from_row(row_number, row)?);
        }

        for (kind, count) in &pool.skipped {
            debug!(kind = %kind, count, "skipped non single-scheme rows");
        }

        Ok(pool)
    }
}

fn candidate_from_row(
    row_number: usize,
    row: CandidateRow,
) -> Result<CandidatePair, CandidateImportError> {
    let category_label = required(row_number, "Category", row.category)?;
    let category = BeneficiaryCategory::from_label(&category_label).ok_or_else(|| {
        CandidateImportError::UnknownCategory {
            row: row_number,
            value: category_label.clone(),
        }
    })?;

    let subsidy = match row.subsidy {
        Some(raw) => number(row_number, "Subsidy_Applied", &raw)?,
        None => return Err(CandidateImportError::MissingSubsidy { row: row_number }),
    };

    let employees_before = count(
        row_number,
        "Before_Employees",
        &required(row_number, "Before_Employees", row.employees_before)?,
    )?;
    let employees_after = count(
        row_number,
        "Projected_Employees",
        &required(row_number, "Projected_Employees", row.employees_after)?,
    )?;
    let new_jobs = match row.new_jobs {
        Some(raw) => count(row_number, "New_Jobs_Added", &raw)?,
        None => employees_after.saturating_sub(employees_before),
    };

    Ok(CandidatePair {
        beneficiary_id: required(row_number, "MSME_ID", row.beneficiary_id)?,
        sector: row.sector.map(|value| collapse(&value)).unwrap_or_default(),
        category,
        location_type: row
            .location_type
            .map(|value| collapse(&value))
            .unwrap_or_default(),
        scheme_id: required(row_number, "Scheme_ID", row.scheme_id)?,
        scheme_name: collapse(&required(row_number, "Scheme_Name", row.scheme_name)?),
        revenue_before: required_number(row_number, "Before_Annual_Revenue", row.revenue_before)?,
        employees_before,
        revenue_after: required_number(row_number, "Projected_Revenue", row.revenue_after)?,
        employees_after,
        new_jobs,
        subsidy,
        revenue_increase_pct: required_number(
            row_number,
            "Revenue_Increase_Pct",
            row.revenue_increase_pct,
        )?,
        employment_increase_pct: required_number(
            row_number,
            "Employment_Increase_Pct",
            row.employment_increase_pct,
        )?,
    })
}

fn required(
    row: usize,
    column: &'static str,
    value: Option<String>,
) -> Result<String, CandidateImportError> {
    value.ok_or(CandidateImportError::MissingValue { row, column })
}

fn required_number(
    row: usize,
    column: &'static str,
    value: Option<String>,
) -> Result<f64, CandidateImportError> {
    number(row, column, &required(row, column, value)?)
}

fn number(row: usize, column: &'static str, raw: &str) -> Result<f64, CandidateImportError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CandidateImportError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        })
}

/// Head counts may be written as `12` or `12.0`; anything fractional or negative is rejected.
fn count(row: usize, column: &'static str, raw: &str) -> Result<u32, CandidateImportError> {
    if let Ok(value) = raw.trim().parse::<u32>() {
        return Ok(value);
    }

    let value = number(row, column, raw)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(CandidateImportError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        })
    }
}
