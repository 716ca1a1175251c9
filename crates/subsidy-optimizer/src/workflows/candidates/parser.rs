use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One raw row of the eligibility results file. Every cell is optional here so a
/// missing value can be reported with its row number rather than as a serde error.
#[derive(Debug, Deserialize)]
pub(crate) struct CandidateRow {
    #[serde(rename = "MSME_ID", default, deserialize_with = "empty_string_as_none")]
    pub(crate) beneficiary_id: Option<String>,
    #[serde(rename = "Sector", default, deserialize_with = "empty_string_as_none")]
    pub(crate) sector: Option<String>,
    #[serde(rename = "Category", default, deserialize_with = "empty_string_as_none")]
    pub(crate) category: Option<String>,
    #[serde(
        rename = "Location_Type",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) location_type: Option<String>,
    #[serde(rename = "Scheme_ID", default, deserialize_with = "empty_string_as_none")]
    pub(crate) scheme_id: Option<String>,
    #[serde(
        rename = "Scheme_Name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) scheme_name: Option<String>,
    #[serde(
        rename = "Simulation_Type",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) simulation_type: Option<String>,
    #[serde(
        rename = "Before_Annual_Revenue",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) revenue_before: Option<String>,
    #[serde(
        rename = "Before_Employees",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) employees_before: Option<String>,
    #[serde(
        rename = "Subsidy_Applied",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) subsidy: Option<String>,
    #[serde(
        rename = "New_Jobs_Added",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) new_jobs: Option<String>,
    #[serde(
        rename = "Projected_Revenue",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) revenue_after: Option<String>,
    #[serde(
        rename = "Projected_Employees",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) employees_after: Option<String>,
    #[serde(
        rename = "Revenue_Increase_Pct",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) revenue_increase_pct: Option<String>,
    #[serde(
        rename = "Employment_Increase_Pct",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) employment_increase_pct: Option<String>,
}

pub(crate) const SIMULATION_COLUMN: &str = "Simulation_Type";

pub(crate) struct ParsedRows {
    pub(crate) rows: Vec<CandidateRow>,
    /// Whether the header names a simulation kind column at all.
    pub(crate) has_simulation_column: bool,
}

/// Reads every data row. Returns `None` when the input has no header row at all.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Option<ParsedRows>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    if headers.is_empty() {
        return Ok(None);
    }
    let has_simulation_column = headers.iter().any(|name| name == SIMULATION_COLUMN);

    let rows = csv_reader
        .deserialize::<CandidateRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(ParsedRows {
        rows,
        has_simulation_column,
    }))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
