//! CLI subcommand implementations for the shorecast binary.

pub mod doctor;
pub mod serve;
pub mod shot;
