use aruba_channel_census::{
    api::MgmtApiClient,
    parse_config,
    run_census,
    to_csv,
};
use clap::Parser;
use color_eyre::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

#[derive(Parser, Debug)]
#[command(name = "channel-census")]
#[command(about = "6 GHz channel usage census across an Aruba mobility hierarchy")]
#[command(version)]
struct Args {
    /// Path to census config file (yaml)
    #[arg(long)]
    config: std::path::PathBuf,

    /// Management API user; overrides the config file
    #[arg(long, env = "ARUBA_USERNAME")]
    username: Option<String>,

    /// Management API password; overrides the config file
    #[arg(long, env = "ARUBA_PASSWORD")]
    password: Option<String>,

    /// Also write the tally as JSON to this file
    #[arg(long)]
    output_file: Option<std::path::PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    color_eyre::install().expect("color_eyre init");
    let default_filter = if verbose { "aruba_channel_census=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .with(tracing_error::ErrorLayer::default())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut cfg = parse_config(&args.config)?;
    if let Some(username) = args.username {
        cfg.username = username;
    }
    if let Some(password) = args.password {
        cfg.password = password;
    }
    cfg.validate()?;

    let client = Arc::new(MgmtApiClient::new()?);
    let tally = run_census(&cfg, client).await;

    print!("{}", to_csv(&tally));

    if let Some(output_file) = &args.output_file {
        let json_string = serde_json::to_string_pretty(&tally)?;
        tokio::fs::write(output_file, json_string).await?;
        info!(?output_file, "census: tally exported");
    }

    Ok(())
}
