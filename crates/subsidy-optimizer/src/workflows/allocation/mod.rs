mod currency;
pub mod domain;
mod engine;
pub mod export;
pub mod greedy;
mod justification;
pub mod policy;
pub mod report;
pub mod scoring;
pub mod sensitivity;

pub use domain::{
    AllocationError, BeneficiaryCategory, CandidatePair, Efficiency, RejectedPair,
    RejectionReason, ScoredPair, SelectionRecord, SubBudgetUsage,
};
pub use engine::{AllocationEngine, AllocationRun};
pub use policy::{AllocationMode, AllocationPolicy, CategoryShares, PolicyWeights};
pub use report::{render_text, AllocationDocument, AllocationReport};
pub use sensitivity::{SensitivityRow, SweepOutcome, SENSITIVITY_ALPHAS};
