// Presentation layer - CLI surface
pub mod cli;
pub mod commands;
