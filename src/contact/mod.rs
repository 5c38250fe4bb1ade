pub mod relay;
pub mod submission;
