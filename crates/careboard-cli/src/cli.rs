use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "careboard")]
#[command(about = "Careboard CLI — load and mutate hospital dashboard pages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides config and CAREBOARD_URL env var)
    #[arg(short, long, global = true, env = "CAREBOARD_URL")]
    pub base_url: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "CAREBOARD_PROFILE", default_value = "default")]
    pub profile: String,

    /// Serve every resource from in-process mocks instead of HTTP
    #[arg(long, global = true)]
    pub mock: bool,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered pages and their backing resources
    Pages,
    /// Load a page model (cached unless --force)
    Load(LoadArgs),
    /// Drop cached page models
    Invalidate(InvalidateArgs),
    /// Create a domain record through its connector
    Create(CreateArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoadArgs {
    /// Page key (e.g. Patients)
    pub page: String,
    /// Request parameters as key=value pairs (e.g. hospital_id=3)
    #[arg(short = 'P', long = "param")]
    pub params: Vec<String>,
    /// Bypass the cache and refresh from the backend
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct InvalidateArgs {
    /// Page key; omit to drop the whole cache
    pub page: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CreateDomain {
    Patient,
    Staff,
    Appointment,
    Medication,
    Stock,
    Expense,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Record kind to create
    pub domain: CreateDomain,
    /// Path to JSON payload file (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (base_url, format)
    pub key: String,
    /// Value
    pub value: String,
}
