pub mod get;
pub mod search;

use camaudit_common::config::{DEFAULT_TIMEOUT, DEFAULT_WORKERS};
use camaudit_common::models::device::Credential;
use camaudit_common::network::target::Target;
use camaudit_core::discovery::DEFAULT_QUERY;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "camaudit")]
#[command(version, about = "Audits NVR/DVR fleets for default credentials.")]
pub struct CommandLine {
    /// Show why each device was skipped
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Timeout for each device request, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for devices inside the authorized scope and check each one
    #[command(alias = "s")]
    Search(SearchArgs),
    /// Check a single device
    #[command(alias = "g")]
    Get(GetArgs),
}

#[derive(Args)]
pub struct CredentialArgs {
    #[arg(short, long, default_value = "admin")]
    pub username: String,

    #[arg(short, long)]
    pub password: String,
}

impl CredentialArgs {
    pub fn into_credential(self) -> Credential {
        Credential::new(self.username, self.password)
    }
}

#[derive(Args)]
pub struct SearchArgs {
    /// Shodan API key
    #[arg(long = "shodan-key", env = "SHODAN_KEY", hide_env_values = true)]
    pub shodan_key: String,

    /// Authorized network in CIDR form (repeatable, or comma-separated)
    #[arg(long, required = true, value_delimiter = ',')]
    pub scope: Vec<String>,

    /// Discovery query, narrowed to the scope automatically
    #[arg(short, long, default_value = DEFAULT_QUERY)]
    pub query: String,

    #[command(flatten)]
    pub credential: CredentialArgs,

    /// Notion integration token
    #[arg(long = "notion-token", env = "NOTION_TOKEN", hide_env_values = true)]
    pub notion_token: Option<String>,

    /// Notion database id or link
    #[arg(long)]
    pub database: Option<String>,

    /// Devices probed at the same time
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,
}

#[derive(Args)]
pub struct GetArgs {
    /// Device as address:port
    pub target: Target,

    #[command(flatten)]
    pub credential: CredentialArgs,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
