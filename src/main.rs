use clap::{Parser, Subcommand};
use ops_academy::loader::ContentStore;
use ops_academy::prompts::PromptRegistry;
use ops_academy::{check, config, output};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "ops-academy")]
#[command(about = "Content validation and inventory for operations curricula")]
#[command(long_about = "\
Content validation and inventory for operations curricula

Your filesystem is the catalog. Module YAML files declare lessons,
scenarios, infographics and an assessment; every declared path must
resolve to a real file that passes its own validation.

Content structure:

  content/
  ├── academy.toml                 # Config (optional, overrides defaults)
  ├── modules/
  │   ├── incident-basics.yaml     # Module: the entry point for a course unit
  │   └── capacity-planning.yaml
  ├── lessons/
  │   └── declare.md               # Lesson markdown (word bounds enforced)
  ├── scenarios/
  │   └── paging-storm.yaml        # Decision scenario (one optimal choice)
  ├── infographics/
  │   └── command-loop.svg         # Inline SVG (script tags rejected)
  └── assessments/
      └── incident-basics.yaml     # Quiz cross-checked against the module

Checks run in layers:
  Schema:      every structural violation in a file, not just the first
  Semantics:   scenario choice rules, SVG safety, lesson word bounds
  References:  declared paths exist, ids line up, prerequisites resolve
  Orphans:     content files no module references

Run 'ops-academy gen-config' to generate a documented academy.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content root directory (wins over content_root from config)
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    /// Config file (default: academy.toml inside the content root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate every module and the content files it references
    Check,
    /// List the catalog: modules, lessons, scenarios, assessments
    Show,
    /// List the governed AI prompt registry
    Prompts,
    /// Print a stock academy.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    // Log to stderr so check/show output on stdout stays pipeable.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ops_academy=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check => {
            let (root, config) = resolve(&cli)?;
            let store = ContentStore::new(root);
            let report = check::check_content(&store, &config)?;
            output::print_check_report(&report);
            if !report.passed() {
                std::process::exit(1);
            }
        }
        Command::Show => {
            let (root, _) = resolve(&cli)?;
            let store = ContentStore::new(root);
            let inventory = check::inventory(&store)?;
            output::print_inventory(&inventory);
        }
        Command::Prompts => {
            output::print_prompts(&PromptRegistry::builtin());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resolve the effective config and content root.
///
/// `--config` reads an explicit file; otherwise `academy.toml` is looked
/// up inside the content root (missing file means stock defaults). The
/// root itself comes from `--content` when given, else from the config.
fn resolve(cli: &Cli) -> Result<(PathBuf, config::AcademyConfig), config::ConfigError> {
    let config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => {
            let base = cli
                .content
                .clone()
                .unwrap_or_else(|| PathBuf::from("content"));
            config::load_config(&base)?
        }
    };
    let root = match &cli.content {
        Some(path) => path.clone(),
        None => PathBuf::from(&config.content_root),
    };
    Ok((root, config))
}
