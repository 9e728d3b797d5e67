//! vqa-ask: 向 VQA 服务发送一张图片和一个问题，并打印格式化后的答案。
//!
//! Usage:
//!   vqa-ask --image photo.jpg --question "what color is the car"
//!   vqa-ask --image photo.jpg --question "how many dogs" --host 10.0.0.7 --raw

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vqa_client::{format_answer, ClientConfig, FailureKind, VqaClientBuilder, VqaRequest};

/// Ask a visual question answering server about an image
#[derive(Parser)]
#[command(name = "vqa-ask", version, about)]
struct Cli {
    /// Image file to send
    #[arg(short, long)]
    image: PathBuf,

    /// Question about the image
    #[arg(short, long)]
    question: String,

    /// Server host (overrides config file and VQA_SERVER_URL)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config file and VQA_SERVER_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// YAML client config
    #[arg(short, long, env = "VQA_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of send attempts
    #[arg(long)]
    retries: Option<u32>,

    /// Per-frame read/write timeout in milliseconds
    #[arg(long)]
    io_timeout_ms: Option<u64>,

    /// Print the server's candidate list instead of the spoken phrase
    #[arg(long)]
    raw: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::default(),
    };

    let mut builder = VqaClientBuilder::new().config(config).env_overrides();
    if let Some(host) = cli.host {
        builder = builder.host(host);
    }
    if let Some(port) = cli.port {
        builder = builder.port(port);
    }
    if let Some(retries) = cli.retries {
        builder = builder.retry_budget(retries);
    }
    if let Some(ms) = cli.io_timeout_ms {
        builder = builder.io_timeout(Duration::from_millis(ms));
    }
    let mut client = builder.build()?;

    let image = std::fs::read(&cli.image)
        .with_context(|| format!("reading image {}", cli.image.display()))?;
    let request = VqaRequest::new(image, cli.question);

    let outcome = client.query(&request).await;
    client.close().await;

    match outcome {
        Ok(response) if cli.raw => println!("{}", response.result),
        Ok(response) => println!("{}", format_answer(&response.result)),
        Err(e) if e.kind() == FailureKind::ConnectionFailure => {
            eprintln!("cannot reach VQA server at {}: {}", client.endpoint(), e);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(ExitCode::SUCCESS)
}
