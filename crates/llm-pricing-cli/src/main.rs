use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::Style;
use llm_pricing_core::{
    cache::{default_cache_dir, FsCache},
    config::{FetchConfig, PRICING_URL, ROUTING_URL},
    fetch::Fetcher,
    plan::{self, ModelReport, Outcome},
    PricingFile,
};

mod logging;

use logging::LogFormat;

// ── Palette ──────────────────────────────────────────────────────────

fn s_header() -> Style { Style::new().for_stderr().color256(252).bold() }
fn s_dim() -> Style    { Style::new().for_stderr().color256(248) }
fn s_ok() -> Style     { Style::new().for_stderr().color256(114) }
fn s_warn() -> Style   { Style::new().for_stderr().color256(214) }
fn s_err() -> Style    { Style::new().for_stderr().color256(167) }

// ── CLI Args ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "add-model",
    about = "Add models to the pricing file from the LiteLLM and OpenRouter catalogs",
    version,
    args_conflicts_with_subcommands = true,
    after_help = "examples:\n  \
        add-model openai/gpt-5-2025-08-07                (preview as JSON)\n  \
        add-model gemini-2.0-flash-001 claude-opus-4-1 --apply\n  \
        add-model check                                   (validate the pricing file)"
)]
struct Cli {
    /// Models to add, as `provider/model` or `model`.
    models: Vec<String>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Write the merged result to the pricing file instead of previewing.
    #[arg(long)]
    apply: bool,

    /// Pricing file to read and update.
    #[arg(long, global = true, env = "LLM_PRICING_FILE", default_value = "models.json")]
    file: PathBuf,

    /// Directory for catalog snapshots.
    #[arg(long, env = "LLM_PRICING_CACHE_DIR", default_value_os_t = default_cache_dir())]
    cache_dir: PathBuf,

    #[arg(long, env = "LLM_PRICING_PRICING_URL", default_value = PRICING_URL, hide = true)]
    pricing_url: String,

    #[arg(long, env = "LLM_PRICING_ROUTING_URL", default_value = ROUTING_URL, hide = true)]
    routing_url: String,

    /// HTTP timeout in seconds.
    #[arg(
        long,
        env = "LLM_PRICING_TIMEOUT",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the pricing file's provider records.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.command.is_none() && cli.models.is_empty() {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "at least one model identifier is required",
            )
            .exit();
    }

    logging::init(cli.verbose, cli.log_format);

    match cli.command {
        Some(Commands::Check) => cmd_check(&cli.file),
        None => cmd_add(&cli).await,
    }
}

// ── Add ──────────────────────────────────────────────────────────────

async fn cmd_add(cli: &Cli) -> anyhow::Result<()> {
    let mut file = PricingFile::load(&cli.file)
        .with_context(|| format!("could not read {}", cli.file.display()))?;

    let config = FetchConfig {
        pricing_url: cli.pricing_url.clone(),
        routing_url: cli.routing_url.clone(),
        timeout: Duration::from_secs(cli.timeout),
        ..FetchConfig::default()
    };
    tracing::debug!(cache_dir = %cli.cache_dir.display(), "snapshot directory");
    let cache = FsCache::new(&cli.cache_dir, config.ttl);
    let fetcher = Fetcher::new(cache, config)?;
    let catalogs = fetcher.fetch_catalogs().await?;

    let reports = plan::run(&cli.models, &catalogs, &mut file)?;
    let added = plan::added_entries(&reports);

    print_summary(&reports);

    if !cli.apply {
        println!("{}", serde_json::to_string_pretty(&added)?);
        eprintln!(
            "{}",
            s_dim().apply_to(format!(
                "dry run: {} entr{} would be added; pass --apply to write {}",
                added.len(),
                if added.len() == 1 { "y" } else { "ies" },
                cli.file.display()
            ))
        );
        return Ok(());
    }

    if added.is_empty() {
        eprintln!("{}", s_warn().apply_to("nothing was added"));
        return Ok(());
    }

    file.save(&cli.file)
        .with_context(|| format!("could not write {}", cli.file.display()))?;
    eprintln!(
        "{}",
        s_ok().apply_to(format!("added {} model(s) to {}", added.len(), cli.file.display()))
    );
    Ok(())
}

fn outcome_color(outcome: &Outcome) -> Color {
    match outcome {
        Outcome::Added(_) => Color::AnsiValue(114),
        Outcome::Duplicate(_) => Color::AnsiValue(248),
        _ => Color::AnsiValue(214),
    }
}

fn print_summary(reports: &[ModelReport]) {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("  Requested").fg(Color::AnsiValue(243)),
        Cell::new("Result").fg(Color::AnsiValue(243)),
        Cell::new("Provider").fg(Color::AnsiValue(243)),
        Cell::new("In $/M").fg(Color::AnsiValue(243)),
        Cell::new("Out $/M").fg(Color::AnsiValue(243)),
        Cell::new("OpenRouter").fg(Color::AnsiValue(243)),
    ]);

    for r in reports {
        let entry = match &r.outcome {
            Outcome::Added(e) | Outcome::Duplicate(e) => Some(e),
            _ => None,
        };
        let provider = match &r.outcome {
            Outcome::UnknownProvider(p) => p.clone(),
            _ => entry.map(|e| e.provider.clone()).unwrap_or_default(),
        };
        table.add_row(vec![
            Cell::new(format!("  {}", r.requested)).fg(Color::AnsiValue(252)),
            Cell::new(r.outcome.label()).fg(outcome_color(&r.outcome)),
            Cell::new(provider).fg(Color::AnsiValue(248)),
            Cell::new(entry.map(|e| e.price.input.to_string()).unwrap_or_default()),
            Cell::new(entry.map(|e| e.price.output.to_string()).unwrap_or_default()),
            Cell::new(
                entry
                    .and_then(|e| e.openrouter_identifier.clone())
                    .unwrap_or_else(|| "-".into()),
            )
            .fg(Color::AnsiValue(248)),
        ]);
    }

    eprintln!();
    eprintln!("{}", s_header().apply_to("models"));
    eprintln!("{table}");
    eprintln!();
}

// ── Check ────────────────────────────────────────────────────────────

fn cmd_check(path: &std::path::Path) -> anyhow::Result<()> {
    let file = PricingFile::load(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let violations = file.validate();

    if violations.is_empty() {
        let providers = file.provider_keys().count();
        eprintln!(
            "{}",
            s_ok().apply_to(format!("{}: {providers} providers, ok", path.display()))
        );
        return Ok(());
    }

    for v in &violations {
        eprintln!("  {}", s_err().apply_to(v));
    }
    anyhow::bail!("{}: {} violation(s)", path.display(), violations.len())
}
