/// Simulation kinds emitted by the upstream eligibility step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SimulationKind {
    SingleScheme,
    Other(String),
}

impl SimulationKind {
    pub(crate) fn parse(value: &str) -> Self {
        if normalize_kind(value) == "singlescheme" {
            SimulationKind::SingleScheme
        } else {
            SimulationKind::Other(collapse(value))
        }
    }
}

/// Lowercases and drops separators so `Single_Scheme`, `single-scheme` and `SINGLE SCHEME` agree.
fn normalize_kind(value: &str) -> String {
    collapse(value)
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_ascii_lowercase()
}

pub(crate) fn collapse(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
