pub mod bindings;
pub mod cost;
pub mod memo;
pub mod partition;
pub mod pattern;
pub mod property;
pub mod rule;
