pub mod commands;
pub mod queries;
