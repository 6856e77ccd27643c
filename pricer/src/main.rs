mod api;
mod history;
mod server;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use socioprice::audience::{
    select_platforms, snapshots_from_inputs, AccountSnapshotInput, Platform,
    SocialAccountSnapshot,
};
use socioprice::config::PricingConfig;
use socioprice::pricing::tables::{
    industry_multiplier, region_multiplier, seniority_multiplier, INDUSTRY_MULTIPLIERS,
    REGION_MULTIPLIERS, SENIORITY_MULTIPLIERS,
};
use socioprice::pricing::PricingPipeline;
use socioprice::{
    format_float, format_number, format_percent, format_price, input_fingerprint,
    PricingRequest, ProductType,
};

use crate::history::{new_entry_id, HistoryEntry, HistoryStore};

#[derive(Parser)]
#[command(name = "socioprice", about = "Audience-based product pricing recommendations")]
struct Cli {
    /// Path to a TOML config file. Defaults to $SOCIOPRICE_CONFIG_PATH or config/pricing.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend a price for a product against connected accounts.
    Recommend(RecommendArgs),
    /// Print the merged audience demographics for a set of accounts.
    Aggregate(AggregateArgs),
    /// Look up multiplier table values.
    Tables(TablesArgs),
    /// Write the default configuration file.
    InitConfig(InitConfigArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct RecommendArgs {
    #[arg(long, default_value = "Untitled product")]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "digital_product")]
    product_type: String,
    #[arg(long)]
    cost: Option<f64>,
    #[arg(long)]
    target_margin: Option<f64>,
    /// Limit to these platforms; repeatable.
    #[arg(long = "platform")]
    platforms: Vec<String>,
    /// JSON array of account snapshots; `-` reads stdin.
    #[arg(long)]
    accounts: Option<PathBuf>,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    details: bool,
    /// Append the recommendation to the history file.
    #[arg(long)]
    save: bool,
}

impl Default for RecommendArgs {
    fn default() -> Self {
        Self {
            name: "Untitled product".to_string(),
            description: String::new(),
            product_type: "digital_product".to_string(),
            cost: None,
            target_margin: None,
            platforms: Vec::new(),
            accounts: Some(PathBuf::from("-")),
            json: false,
            details: false,
            save: false,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct AggregateArgs {
    #[arg(long)]
    accounts: Option<PathBuf>,
    #[arg(long = "platform")]
    platforms: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct TablesArgs {
    #[arg(long)]
    industry: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    seniority: Option<String>,
    #[arg(long)]
    product_type: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/pricing.toml")]
    path: PathBuf,
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    /// Directory of a static web UI to serve alongside the API.
    #[arg(long)]
    web_root: Option<String>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, config_path) = PricingConfig::load(cli.config).map_err(|err| err.to_string())?;
    init_tracing(&config.log_level);
    if let Some(path) = config_path.as_ref().filter(|path| path.exists()) {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let command = cli
        .command
        .unwrap_or(Command::Recommend(RecommendArgs::default()));

    match command {
        Command::Recommend(args) => run_recommend(args, &config).await,
        Command::Aggregate(args) => run_aggregate(args, &config),
        Command::Tables(args) => run_tables(args),
        Command::InitConfig(args) => run_init_config(args),
        Command::Serve(args) => server::serve(args, config).await,
    }
}

async fn run_recommend(args: RecommendArgs, config: &PricingConfig) -> Result<(), String> {
    let request = PricingRequest {
        name: args.name,
        description: args.description,
        product_type: args.product_type,
        cost: args.cost,
        target_margin: args.target_margin,
        platforms: parse_platforms(&args.platforms)?,
    };
    let accounts = read_accounts(args.accounts.as_deref())?;

    let pipeline = PricingPipeline::from_config(config);
    let analysis = pipeline
        .analyze(&request, &accounts)
        .map_err(|err| err.to_string())?;

    if args.save {
        let store = HistoryStore::load(config.storage.history_path(), config.storage.history_limit)
            .await
            .map_err(|err| err.to_string())?;
        let fingerprint = input_fingerprint(&request, &accounts);
        let entry = HistoryEntry {
            id: new_entry_id(&fingerprint),
            created_at: Utc::now(),
            fingerprint,
            request: request.clone(),
            recommendation: analysis.recommendation.clone(),
        };
        let saved = store.add(entry).await.map_err(|err| err.to_string())?;
        tracing::info!(id = %saved.id, "saved recommendation to history");
    }

    if args.json {
        let payload = serde_json::to_string_pretty(&analysis.recommendation)
            .map_err(|err| format!("failed to serialize recommendation: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    let overall = &analysis.recommendation.overall_recommendation;
    println!(
        "Recommended price for {}: {} (range {} - {})",
        request.name,
        format_price(overall.optimal_price),
        format_price(overall.min_price),
        format_price(overall.max_price)
    );
    println!(
        "Expected conversion: {} | confidence {}",
        format_percent(overall.conversion_rate),
        format_float(overall.confidence, 2)
    );
    println!(
        "Audience: {} followers across {} account(s)",
        format_number(analysis.aggregated.total_followers as f64),
        analysis.accounts_used
    );

    if args.details {
        let estimate = &analysis.estimate;
        println!(
            "\nBase price ({}): {}",
            estimate.product_type.label(),
            format_price(estimate.base_price)
        );
        println!("Multipliers:");
        println!("  followers: {}", format_float(estimate.multipliers.follower, 3));
        println!("  industry: {}", format_float(estimate.multipliers.industry, 3));
        println!("  location: {}", format_float(estimate.multipliers.location, 3));
        println!("  engagement: {}", format_float(estimate.multipliers.engagement, 3));
        let factors = &estimate.confidence_factors;
        println!("Confidence factors:");
        println!("  data completeness: {}", format_float(factors.data_completeness, 2));
        println!("  follower significance: {}", format_float(factors.follower_significance, 2));
        println!("  engagement quality: {}", format_float(factors.engagement_quality, 2));
        println!("  geographic diversity: {}", format_float(factors.geographic_diversity, 2));
        println!("  industry diversity: {}", format_float(factors.industry_diversity, 2));
    }

    println!("\nSegments:");
    for segment in &analysis.recommendation.segments {
        for point in &segment.recommended_prices {
            println!(
                "- {}: {} at {} conversion ({})",
                segment.name,
                format_price(point.amount),
                format_percent(point.conversion_rate),
                segment.description
            );
        }
    }

    Ok(())
}

fn run_aggregate(args: AggregateArgs, config: &PricingConfig) -> Result<(), String> {
    let platforms = parse_platforms(&args.platforms)?;
    let accounts = read_accounts(args.accounts.as_deref())?;
    let selected = select_platforms(&accounts, &platforms);
    let aggregated = PricingPipeline::from_config(config)
        .aggregate(&selected)
        .map_err(|err| err.to_string())?;
    let payload = serde_json::to_string_pretty(&aggregated)
        .map_err(|err| format!("failed to serialize demographics: {}", err))?;
    println!("{}", payload);
    Ok(())
}

fn run_tables(args: TablesArgs) -> Result<(), String> {
    let mut looked_up = false;
    if let Some(industry) = args.industry.as_deref() {
        println!("industry {}: {}", industry, format_float(industry_multiplier(industry), 2));
        looked_up = true;
    }
    if let Some(region) = args.region.as_deref() {
        println!("region {}: {}", region, format_float(region_multiplier(region), 2));
        looked_up = true;
    }
    if let Some(seniority) = args.seniority.as_deref() {
        println!("seniority {}: {}", seniority, format_float(seniority_multiplier(seniority), 2));
        looked_up = true;
    }
    if let Some(value) = args.product_type.as_deref() {
        let product = ProductType::parse(value)
            .ok_or_else(|| format!("invalid product type: {}", value))?;
        print_product(product);
        looked_up = true;
    }
    if looked_up {
        return Ok(());
    }

    println!("Product types:");
    for product in ProductType::ALL {
        print_product(product);
    }
    print_table("Industries", INDUSTRY_MULTIPLIERS);
    print_table("Regions", REGION_MULTIPLIERS);
    print_table("Seniority", SENIORITY_MULTIPLIERS);
    Ok(())
}

fn print_product(product: ProductType) {
    let band = product
        .price_band()
        .map(|band| format!("{} - {}", format_price(band.min), format_price(band.max)))
        .unwrap_or_else(|| "unbounded".to_string());
    println!(
        "  {}: base {} (band {})",
        product.label(),
        format_price(product.base_price()),
        band
    );
}

fn print_table(title: &str, table: &[(&str, f64)]) {
    println!("{}:", title);
    for (name, value) in table {
        println!("  {}: {}", name, format_float(*value, 2));
    }
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "{} already exists; pass --force to overwrite",
            args.path.display()
        ));
    }
    PricingConfig::default()
        .write(&args.path)
        .map_err(|err| err.to_string())?;
    println!("Wrote {}", args.path.display());
    Ok(())
}

fn parse_platforms(values: &[String]) -> Result<Vec<Platform>, String> {
    values
        .iter()
        .map(|value| {
            Platform::from_str(value).ok_or_else(|| format!("invalid platform: {}", value))
        })
        .collect()
}

fn read_accounts(path: Option<&Path>) -> Result<Vec<SocialAccountSnapshot>, String> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let data = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| format!("failed reading stdin: {}", err))?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .map_err(|err| format!("failed reading {}: {}", path.display(), err))?
    };

    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let inputs: Vec<AccountSnapshotInput> = serde_json::from_str(&data)
        .map_err(|err| format!("failed to parse accounts: {}", err))?;
    snapshots_from_inputs(inputs, Utc::now()).map_err(|err| err.to_string())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
