pub mod batch;
pub mod optimizer;
