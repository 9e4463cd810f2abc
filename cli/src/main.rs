use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use healthnav_backend_client::BackendClient;
use healthnav_backend_client::DEFAULT_BASE_URL;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "healthnav", about = "Healthcare referral navigator and KPI dashboard")]
struct Cli {
    /// Base URL of the healthcare-data backend.
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up referral options for a facility (State → District →
    /// Subdistrict → Facility).
    Referral,
    /// Browse KPI data (State → District → Data Source → Year).
    Kpi,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = BackendClient::new(&cli.base_url)?;
    match cli.command {
        Command::Referral => healthnav_cli::run_referral(client).await,
        Command::Kpi => healthnav_cli::run_kpi(client).await,
    }
}
