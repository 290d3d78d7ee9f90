use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "preview-cli")]
#[command(about = "Command-line client for the preview gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current preview document
    Show,
    /// Replace the preview document with the contents of a file
    Push {
        /// HTML file to publish
        file: PathBuf,
    },
    /// Send a chat-completion payload through the relay
    Chat {
        /// JSON file holding the request payload
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Show => {
            let res = client.get(format!("{}/preview", base)).send().await?;
            println!("{}", res.text().await?);
        }
        Commands::Push { file } => {
            let html = tokio::fs::read_to_string(&file).await?;
            let res = client
                .post(format!("{}/preview/update", base))
                .json(&json!({ "html": html }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Chat { file } => {
            let payload: Value = serde_json::from_str(&tokio::fs::read_to_string(&file).await?)?;
            let res = client
                .post(format!("{}/api/chat", base))
                .json(&payload)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
