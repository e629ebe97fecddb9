// Command line surface
use crate::infrastructure::config::DEFAULT_CONFIG_PATH;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "obs-provision",
    about = "Provision tenant organizations, data sources and dashboards on the observability platform",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Configuration file, with or without extension
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create organizations, tenant-scoped data sources and service account tokens
    BootstrapTenants,
    /// Import the curated dashboards into their target organizations
    ImportDashboards,
}
