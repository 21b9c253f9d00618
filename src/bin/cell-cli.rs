use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "cell-cli")]
#[command(about = "Query a running cell monitor", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000", env = "CELL_MONITOR_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is up
    Health,
    /// List active cells
    Cells,
    /// Show cell counts by status
    Stats,
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::Health => "/api/health",
            Commands::Cells => "/api/cells",
            Commands::Stats => "/api/stats",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let url = format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path());
    let res = client.get(&url).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> anyhow::Result<()> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) if status.is_success() => {
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Ok(json) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("{}", serde_json::to_string_pretty(&json)?);
        }
        Err(_) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("Response: {}", text);
        }
    }
    Ok(())
}
