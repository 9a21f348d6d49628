use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, warn};

use rate_engine::api::{AppState, CalculationRequest, create_router};
use rate_engine::calculation::calculate_price;
use rate_engine::config::ConfigLoader;
use rate_engine::error::ServiceError;
use rate_engine::models::TieBreakStrategy;
use rate_engine::settings::ServerSettings;
use rate_engine::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "rate-engine",
    about = "Price catering deliveries and driver pay from a tiered rate card",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Price one order and print the result as JSON
    Quote(QuoteArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Override the rate card directory
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Client type whose profile prices the order
    #[arg(long, default_value = "standard")]
    client_type: String,
    /// Number of guests
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    headcount: i64,
    /// Order subtotal
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    subtotal: Decimal,
    /// Total delivery distance in miles
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    mileage: Decimal,
    /// Toll fee
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    toll_fee: Decimal,
    /// Gratuity is included in the order
    #[arg(long)]
    gratuity: bool,
    /// Number of orders placed together
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    order_count: i64,
    /// Number of stops on the route
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    stops: i64,
    /// Tip passed through to the driver
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    tip: Decimal,
    /// Override the profile's tie-break strategy
    #[arg(long, value_parser = parse_tie_break)]
    tie_break: Option<TieBreakStrategy>,
    /// Override the rate card directory
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

fn parse_tie_break(raw: &str) -> Result<TieBreakStrategy, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).map_err(|_| {
        format!(
            "unknown strategy '{}' (expected lower_rate, higher_rate, headcount_priority or cost_priority)",
            raw
        )
    })
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("rate-engine error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServiceError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let mut settings = ServerSettings::load()?;
    telemetry::init(&settings.log_level)?;

    match command {
        Command::Serve(args) => {
            if let Some(host) = args.host {
                settings.host = host;
            }
            if let Some(port) = args.port {
                settings.port = port;
            }
            if let Some(dir) = args.config_dir {
                settings.config_dir = dir;
            }
            serve(settings).await
        }
        Command::Quote(args) => {
            if let Some(dir) = args.config_dir.clone() {
                settings.config_dir = dir;
            }
            quote(&settings, args)
        }
    }
}

async fn serve(settings: ServerSettings) -> Result<(), ServiceError> {
    let config = ConfigLoader::load(&settings.config_dir)?;
    info!(
        config_dir = %settings.config_dir.display(),
        rate_card = %config.metadata().name,
        version = %config.metadata().version,
        "rate card loaded"
    );

    let app = create_router(AppState::new(config));
    let addr = settings.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "rate engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn quote(settings: &ServerSettings, args: QuoteArgs) -> Result<(), ServiceError> {
    let config = ConfigLoader::load(&settings.config_dir)?;

    let request = CalculationRequest {
        client_type: args.client_type,
        headcount: args.headcount,
        subtotal: args.subtotal,
        mileage: args.mileage,
        toll_fee: args.toll_fee,
        has_gratuity: args.gratuity,
        order_count: args.order_count,
        stops: args.stops,
        tip_amount: args.tip,
        tie_break: args.tie_break,
    };
    let tie_break = request.tie_break;
    let (ctx, adjusted) = request.into_order_context()?;
    if !adjusted.is_empty() {
        warn!(fields = ?adjusted, "Out-of-range arguments coerced");
    }

    let result = calculate_price(config.card(), &ctx, tie_break);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
