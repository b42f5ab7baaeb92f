//! ssdbkv CLI Client
//!
//! Runs one command against a server and prints the reply.

use clap::Parser;
use ssdbkv::{Arg, Client, Config, EasyClient};
use tracing_subscriber::{fmt, EnvFilter};

/// ssdbkv CLI
#[derive(Parser, Debug)]
#[command(name = "ssdbkv-cli")]
#[command(about = "CLI for SSDB-compatible key-value stores")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8888")]
    port: u16,

    /// Read/write timeout in milliseconds (0 = blocking)
    #[arg(short, long, default_value = "2000")]
    timeout_ms: u64,

    /// Password sent before the command
    #[arg(short = 'a', long)]
    password: Option<String>,

    /// Print the simplified value instead of the full reply
    #[arg(short, long)]
    easy: bool,

    /// Command name (e.g. get, hgetall, zscan)
    command: String,

    /// Command arguments
    args: Vec<String>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ssdbkv=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> ssdbkv::Result<()> {
    let mut builder = Config::builder()
        .host(&args.host)
        .port(args.port)
        .timeout_ms(args.timeout_ms)
        .strict(true);
    if let Some(password) = &args.password {
        builder = builder.password(password);
    }
    let config = builder.build();

    let command_args: Vec<Arg> = args.args.iter().map(Arg::from).collect();

    if args.easy {
        let mut client = EasyClient::connect(config)?;
        let outcome = client.call_str(&args.command, &command_args)?;
        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| ssdbkv::SsdbError::Serialization(e.to_string()))?;
        println!("{}", json);
    } else {
        let mut client = Client::connect(config)?;
        let reply = client.call_str(&args.command, &command_args)?;
        println!("{}", reply);
    }

    Ok(())
}
