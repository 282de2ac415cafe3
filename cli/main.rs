#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

use idearank::config::RunConfig;
use idearank::data::{PricingInput, demo_ideas, load_ideas, load_pricing_inputs, template_header};
use idearank::model::Model;
use idearank::pipeline::Pipeline;
use idearank::portfolio::PortfolioSelector;
use idearank::price::{self, coerce_unit_cost};
use idearank::report::{
    self, FilteredIdeas, Filters, SortKey, SortOrder, Summary, format_money, write_brief,
    write_portfolio, write_predictions, write_price_points, write_pricing_report,
};
use idearank::types::{Idea, PricePoint, ScoredIdea, coerce_number};

#[derive(Clone, Copy, ValueEnum)]
pub enum OrderCli {
    Asc,
    Desc,
}

impl From<OrderCli> for SortOrder {
    fn from(order: OrderCli) -> Self {
        match order {
            OrderCli::Asc => SortOrder::Ascending,
            OrderCli::Desc => SortOrder::Descending,
        }
    }
}

/// Settings shared by every scoring command.
#[derive(Args)]
pub struct RunArgs {
    /// Path to a TOML run configuration. Explicit flags take precedence over its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cost per unit sold, used for expected profit
    #[arg(long)]
    pub unit_cost: Option<f64>,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Drop ideas with fewer projected users (0 disables)
    #[arg(long)]
    pub min_users: Option<f64>,

    /// Drop ideas below this success probability (0 disables)
    #[arg(long)]
    pub min_prob: Option<f64>,

    /// Drop ideas taking longer than this many weeks (0 disables)
    #[arg(long)]
    pub max_weeks_per_idea: Option<f64>,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Path to an ideas CSV with the template header
    pub ideas: PathBuf,

    /// Path to a JSON model file. The built-in model is used when omitted
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Args)]
pub struct RankArgs {
    #[command(flatten)]
    pub score: ScoreArgs,

    /// Report column to sort by, e.g. expected_revenue
    #[arg(long, value_name = "COLUMN")]
    pub sort_key: Option<String>,

    /// Sort direction, used together with --sort-key
    #[arg(long, value_enum, default_value_t = OrderCli::Desc)]
    pub order: OrderCli,

    /// Where to write the pricing report
    #[arg(long, default_value = "pricing_report.csv")]
    pub out: PathBuf,
}

#[derive(Args)]
pub struct PortfolioArgs {
    #[command(flatten)]
    pub score: ScoreArgs,

    /// Total development weeks available
    #[arg(long)]
    pub max_weeks: Option<f64>,

    /// Where to write the selected ideas
    #[arg(long, default_value = "portfolio.csv")]
    pub out: PathBuf,
}

#[derive(Parser)]
#[command(name = "idearank", about = "Score, price and select product ideas")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the success probability of every idea
    #[command(about = "Predict success probabilities (outputs: predictions.csv)")]
    Predict {
        /// Path to an ideas CSV with the template header
        ideas: PathBuf,

        /// Path to a JSON model file. The built-in model is used when omitted
        #[arg(long, value_name = "FILE")]
        model: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,

        #[arg(long, default_value = "predictions.csv")]
        out: PathBuf,
    },

    /// Price ideas whose success probability is already known
    #[command(about = "Find the best price for precomputed probabilities (outputs: pricing.csv)")]
    Price {
        /// CSV with prob_success and projected_users columns
        input: PathBuf,

        #[command(flatten)]
        run: RunArgs,

        #[arg(long, default_value = "pricing.csv")]
        out: PathBuf,
    },

    /// Score, price, filter and sort ideas into a full report
    #[command(about = "Score and price ideas (outputs: pricing_report.csv)")]
    Rank(RankArgs),

    /// Pick the revenue-maximizing set of ideas within a week budget
    #[command(about = "Select a portfolio under a week budget (outputs: portfolio.csv)")]
    Portfolio(PortfolioArgs),

    /// Write a plain-text product brief for a batch of ideas
    #[command(about = "Write a product brief (outputs: product_brief.txt)")]
    Report {
        #[command(flatten)]
        score: ScoreArgs,

        #[arg(long, default_value = "product_brief.txt")]
        out: PathBuf,
    },

    /// Write an empty ideas CSV with the expected header
    #[command(about = "Write the ideas CSV template (outputs: ideas_template.csv)")]
    Template {
        #[arg(long, default_value = "ideas_template.csv")]
        out: PathBuf,
    },

    /// Rank the built-in demo ideas with the built-in model
    #[command(about = "Rank the demo ideas (outputs: demo_report.csv)")]
    Demo {
        #[command(flatten)]
        run: RunArgs,

        #[arg(long, default_value = "demo_report.csv")]
        out: PathBuf,
    },

    /// Display version and build information
    #[command(about = "Display version and build information")]
    Version,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let Cli { command } = Cli::parse();

    let result = match command {
        Some(Commands::Predict {
            ideas,
            model,
            run,
            out,
        }) => run_predict(&ideas, model.as_deref(), &run, &out),
        Some(Commands::Price { input, run, out }) => run_price(&input, &run, &out),
        Some(Commands::Rank(args)) => run_rank(args),
        Some(Commands::Portfolio(args)) => run_portfolio(args),
        Some(Commands::Report { score, out }) => run_report(&score, &out),
        Some(Commands::Template { out }) => run_template(&out),
        Some(Commands::Demo { run, out }) => run_demo(&run, &out),
        Some(Commands::Version) => {
            print_version_info();
            Ok(())
        }
        None => print_help(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_help() -> Result<(), Box<dyn std::error::Error>> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}

/// Loads the TOML file if given, then lets explicit flags win.
fn resolve_config(
    run: &RunArgs,
    filters: Option<&FilterArgs>,
    max_weeks: Option<f64>,
) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut config = match &run.config {
        Some(path) => {
            println!("Loading run configuration from: {}", path.display());
            RunConfig::load(path)?
        }
        None => RunConfig::default(),
    };

    if let Some(unit_cost) = run.unit_cost {
        config.unit_cost = unit_cost;
    }
    if let Some(filters) = filters {
        if let Some(v) = filters.min_users {
            config.min_users = coerce_number(v);
        }
        if let Some(v) = filters.min_prob {
            config.min_prob = coerce_number(v);
        }
        if let Some(v) = filters.max_weeks_per_idea {
            config.max_weeks_per_idea = coerce_number(v);
        }
    }
    if let Some(weeks) = max_weeks {
        config.max_weeks = coerce_number(weeks);
    }
    // Every command, and the brief, report the cost profit was computed with.
    config.unit_cost = coerce_unit_cost(config.unit_cost);

    config.validate()?;
    Ok(config)
}

fn load_model(path: Option<&Path>) -> Result<Model, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            println!("Loading model from: {}", path.display());
            Ok(Model::load(path)?)
        }
        None => {
            println!("Using the built-in model.");
            Ok(Model::embedded_default())
        }
    }
}

fn filters_from(config: &RunConfig) -> Filters {
    Filters {
        min_users: config.min_users,
        min_prob: config.min_prob,
        max_weeks_per_idea: config.max_weeks_per_idea,
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>, Box<dyn std::error::Error>> {
    Ok(BufWriter::new(File::create(path)?))
}

fn score_batch(
    model: &Model,
    ideas: &[Idea],
    config: &RunConfig,
) -> Result<Vec<ScoredIdea>, Box<dyn std::error::Error>> {
    let scored = Pipeline::new(model, config.unit_cost)
        .with_parallel_threshold(config.parallel_threshold)
        .score_all(ideas)?;
    Ok(scored)
}

/// Loads, scores and filters the ideas named by `args`.
fn score_from_args(
    args: &ScoreArgs,
    max_weeks: Option<f64>,
) -> Result<(RunConfig, FilteredIdeas), Box<dyn std::error::Error>> {
    let config = resolve_config(&args.run, Some(&args.filters), max_weeks)?;
    let model = load_model(args.model.as_deref())?;

    println!("Loading ideas from: {}", args.ideas.display());
    let ideas = load_ideas(&args.ideas)?;
    println!("Loaded {} ideas", ideas.len());

    let scored = score_batch(&model, &ideas, &config)?;
    let kept = filters_from(&config).apply(&scored);
    if kept.is_empty() && !scored.is_empty() {
        println!("No ideas passed the filters");
    } else if kept.len() != scored.len() {
        println!("Filters kept {} of {} ideas", kept.len(), scored.len());
    }
    Ok((config, kept))
}

fn run_predict(
    ideas_path: &Path,
    model_path: Option<&Path>,
    run: &RunArgs,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(run, None, None)?;
    let model = load_model(model_path)?;

    println!("Loading ideas from: {}", ideas_path.display());
    let ideas = load_ideas(ideas_path)?;
    println!("Loaded {} ideas", ideas.len());

    let scored = score_batch(&model, &ideas, &config)?;
    let probabilities: Vec<f64> = scored.iter().map(|s| s.prob_success).collect();
    write_predictions(create_output(out)?, &probabilities)?;
    println!("Predictions saved to: {}", out.display());
    Ok(())
}

fn run_price(input: &Path, run: &RunArgs, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(run, None, None)?;

    println!("Loading pricing inputs from: {}", input.display());
    let inputs = load_pricing_inputs(input)?;
    println!("Loaded {} rows", inputs.len());

    let rows: Vec<(PricingInput, PricePoint)> = inputs
        .into_iter()
        .map(|row| {
            let point = price::optimize(row.prob_success, row.projected_users, config.unit_cost);
            (row, point)
        })
        .collect();
    write_price_points(create_output(out)?, &rows)?;
    println!("Pricing saved to: {}", out.display());
    Ok(())
}

fn print_and_write_ranking(
    scored: &[ScoredIdea],
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    for (rank, idea) in scored.iter().enumerate() {
        println!("{:>4}. {idea}", rank + 1);
    }
    println!("{}", Summary::of(scored));
    write_pricing_report(create_output(out)?, scored)?;
    println!("Pricing report saved to: {}", out.display());
    Ok(())
}

fn run_rank(args: RankArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Parse the key before any work so a typo fails fast.
    let sort_key = args
        .sort_key
        .as_deref()
        .map(str::parse::<SortKey>)
        .transpose()?;

    let (_, batch) = score_from_args(&args.score, None)?;
    let ordered = match sort_key {
        Some(key) => {
            println!("Sorting by {}", key.name());
            report::sorted(&batch.ideas, key, args.order.into())
        }
        None => batch.ideas,
    };
    print_and_write_ranking(&ordered, &args.out)
}

fn run_portfolio(args: PortfolioArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, batch) = score_from_args(&args.score, args.max_weeks)?;

    let selector = PortfolioSelector::new(config.capacity_ceiling);
    let selection = selector.select(&batch.ideas, config.max_weeks)?;

    println!(
        "Selected {} of {} ideas within {} weeks",
        selection.count(),
        batch.len(),
        selection.budget_weeks
    );
    println!(
        "Total weeks: {:.1} | Total revenue: {} | Total profit: {}",
        selection.total_weeks,
        format_money(selection.total_revenue),
        format_money(selection.total_profit)
    );
    for &index in &selection.indices {
        if let Some(idea) = batch.ideas.get(index) {
            println!("  #{} {idea}", batch.row_number(index));
        }
    }

    write_portfolio(create_output(&args.out)?, &batch, &selection)?;
    println!("Portfolio saved to: {}", args.out.display());
    Ok(())
}

fn run_report(args: &ScoreArgs, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (config, batch) = score_from_args(args, None)?;
    let summary = Summary::of(&batch.ideas);
    write_brief(create_output(out)?, &summary, config.unit_cost)?;
    println!("{summary}");
    println!("Product brief saved to: {}", out.display());
    Ok(())
}

fn run_template(out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(out, format!("{}\n", template_header()))?;
    println!("Template saved to: {}", out.display());
    Ok(())
}

fn run_demo(run: &RunArgs, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(run, None, None)?;
    let model = Model::embedded_default();
    let scored = score_batch(&model, &demo_ideas(), &config)?;
    print_and_write_ranking(&scored, out)
}

/// Format seconds into a human-readable duration like "2.4 hours ago"
fn format_duration_ago(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const WEEK: u64 = 7 * DAY;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    let units = [
        (YEAR, "years"),
        (MONTH, "months"),
        (WEEK, "weeks"),
        (DAY, "days"),
        (HOUR, "hours"),
        (MINUTE, "minutes"),
    ];
    match units.iter().find(|(size, _)| seconds >= *size) {
        Some((size, name)) => format!("{:.1} {name} ago", seconds as f64 / *size as f64),
        None => format!("{seconds} seconds ago"),
    }
}

fn print_version_info() {
    let version = env!("CARGO_PKG_VERSION");
    let release_tag = option_env!("IDEARANK_RELEASE_TAG");
    let build_timestamp: u64 = option_env!("IDEARANK_BUILD_TIMESTAMP")
        .and_then(|t| t.parse().ok())
        .unwrap_or(0);

    println!("idearank {version}");

    match release_tag {
        Some(tag) => println!("Release: {tag}"),
        None => println!("Release: development build"),
    }

    if build_timestamp > 0 {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        if now > build_timestamp {
            println!("Built: {}", format_duration_ago(now - build_timestamp));
        } else {
            println!("Built: just now");
        }
    }
}
