pub mod allocation;
pub mod candidates;
