use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Management CLI for the tunnel proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:10000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the proxy configuration and current upstream
    Status,
    /// Probe upstream reachability through the proxy
    Health,
    /// Point the proxy at a new upstream URL
    Update {
        /// New upstream base URL
        tunnel_url: String,

        /// Label recorded with the update
        #[arg(short, long, default_value = "proxy-cli")]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", base)).send().await?,
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Update { tunnel_url, source } => {
            client
                .post(format!("{}/tunnel_update", base))
                .json(&json!({
                    "tunnel_url": tunnel_url,
                    "source": source,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    // /health answers 503 with a JSON body worth showing.
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        std::process::exit(1);
    }
    Ok(())
}
