pub mod cascades;
pub mod core;
pub mod rule;
