//! Courier CLI
//!
//! Sends one request through the full pipeline and prints the decoded
//! response as JSON.
//!
//! Usage:
//!   courier [OPTIONS] <METHOD> <URL>
//!
//! Examples:
//!   courier --base-url https://api.example.com GET /users/:id --param id=7
//!   courier --mock POST /notes --param text=hello

use anyhow::Context;
use clap::Parser;
use courier::{
    CallOptions, Client, ClientConfig, Params, RequestOptions, ResponseData, ResponseShape,
};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(author, version, about = "Send an HTTP request through the courier pipeline")]
struct Args {
    /// HTTP method
    method: String,

    /// Request URL, relative to the base URL; may contain :name placeholders
    url: String,

    /// Client configuration file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL prepended to the request URL
    #[arg(long, env = "COURIER_BASE_URL")]
    base_url: Option<String>,

    /// Echo the params back after a simulated delay instead of sending
    #[arg(long)]
    mock: bool,

    /// Log filter, e.g. "debug" or "courier=trace"
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    /// Track the request under this id
    #[arg(long)]
    id: Option<String>,

    /// Request parameter as key=value; JSON values are parsed
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Extra header as name:value
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    headers: Vec<String>,

    /// Response shape: json, text, blob, arrayBuffer or formData
    #[arg(short, long, default_value = "json")]
    shape: ResponseShape,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&args.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if args.mock {
        config.mock = true;
    }

    let client = Client::from_config(config)?;
    let request = build_request(&args)?;

    info!("Sending {} {}{}", args.method, client.base_url(), args.url);
    let future = client.request(request);

    let outcome = tokio::select! {
        result = future.result() => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, canceling request");
            future.cancel();
            future.result().await
        }
    };

    let data = outcome?;
    println!("{}", serde_json::to_string_pretty(&data.to_json())?);
    Ok(())
}

fn build_request(args: &Args) -> anyhow::Result<RequestOptions<ResponseData>> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid method '{}'", args.method))?;

    let mut options = CallOptions::new()
        .shape(args.shape)
        .fallback_mock(|params| ResponseData::Json(Value::Object(params)));
    if let Some(id) = &args.id {
        options = options.request_id(id.clone());
    }
    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("header '{header}' must be name:value"))?;
        options = options.header(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }

    Ok(RequestOptions::new(args.url.clone())
        .method(method)
        .params(parse_params(&args.params)?)
        .options(options))
}

fn parse_params(pairs: &[String]) -> anyhow::Result<Params> {
    let mut params = Params::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("param '{pair}' must be key=value"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        params.insert(key.to_string(), value);
    }
    Ok(params)
}
