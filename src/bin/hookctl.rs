use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "hookctl")]
#[command(about = "Send test alerts to the alert webhook receiver", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9999")]
    url: String,

    /// Value for the x-api-token header
    #[arg(short, long, env = "API_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the liveness endpoint
    Health,
    /// Send a firing alert
    Fire,
    /// Send a resolved alert
    Resolve,
    /// Send a JSON file as the alert body
    Send { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = cli.token.as_deref().filter(|t| !t.is_empty()) {
        headers.insert("x-api-token", HeaderValue::from_str(token)?);
    }

    let webhook = format!("{}/test", cli.url.trim_end_matches('/'));
    let res = match cli.command {
        Commands::Health => {
            client
                .get(format!("{}/health", cli.url.trim_end_matches('/')))
                .send()
                .await?
        }
        Commands::Fire => {
            client
                .post(&webhook)
                .headers(headers)
                .json(&sample_alert("firing"))
                .send()
                .await?
        }
        Commands::Resolve => {
            client
                .post(&webhook)
                .headers(headers)
                .json(&sample_alert("resolved"))
                .send()
                .await?
        }
        Commands::Send { file } => {
            let body: Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            client
                .post(&webhook)
                .headers(headers)
                .json(&body)
                .send()
                .await?
        }
    };

    print_response(res).await
}

fn sample_alert(status: &str) -> Value {
    json!({
        "receiver": "hookctl",
        "status": status,
        "alerts": [{
            "status": status,
            "labels": { "alertname": "HookctlTest", "severity": "info" },
            "annotations": { "summary": "Test alert sent by hookctl" }
        }],
        "title": format!("[{}] HookctlTest", status.to_uppercase()),
    })
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let request_id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let text = res.text().await?;

    println!("{} (request id {})", status, request_id);
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        return Err(format!("receiver returned {}", status).into());
    }
    Ok(())
}
