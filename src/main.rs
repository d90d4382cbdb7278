use clap::{Parser, Subcommand};
use static_i18n::assemble::Site;
use static_i18n::render::MarkdownRenderer;
use static_i18n::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "static-i18n")]
#[command(about = "Multilingual static documentation builder")]
#[command(long_about = "\
Multilingual static documentation builder

One docs directory, many languages. Each file is either localized, by a
filename suffix or a top-level language folder, or shared by every language.
Missing translations fall back to the default language, then to the shared
file.

Docs structure (docs_structure = \"suffix\", the default):

  docs/
  ├── config.toml                  # Site config (optional)
  ├── index.md                     # Shared / default-language homepage
  ├── index.fr.md                  # French homepage
  ├── guide/start.md
  └── assets/logo.png              # Shared asset, copied into every tree

Docs structure (docs_structure = \"folder\"):

  docs/
  ├── en/index.md
  ├── fr/index.md
  └── assets/logo.png              # Outside a language folder = shared

Output:

  site/
  ├── index.html                   # Root tree: always the default language
  ├── fr/index.html                # One tree per language with build = true
  ├── search/search_index.json
  └── sitemap.xml                  # Only when site_url is set

Run 'static-i18n gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Docs directory (holds config.toml)
    #[arg(long, default_value = "docs", global = true)]
    docs: PathBuf,

    /// Output directory
    #[arg(long, default_value = "site", global = true)]
    site: PathBuf,

    /// Worker threads for building trees (default: all cores)
    #[arg(long, global = true)]
    jobs: Option<usize>,

    /// Log every file decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List logical documents and their locale variants
    Scan,
    /// Resolve and plan every output tree without writing
    Check,
    /// Build the site
    Build,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Scan => {
            let site = Site::load(&cli.docs, config::load_config(&cli.docs)?)?;
            output::print_scan_output(&site.index);
        }
        Command::Check => {
            println!("==> Checking {}", cli.docs.display());
            let site = Site::load(&cli.docs, config::load_config(&cli.docs)?)?;
            let plan = site.plan()?;
            output::print_plan_output(&plan);
            println!("==> No conflicts");
        }
        Command::Build => {
            init_thread_pool(cli.jobs);
            println!(
                "==> Building {} → {}",
                cli.docs.display(),
                cli.site.display()
            );
            let site = Site::load(&cli.docs, config::load_config(&cli.docs)?)?;
            let report = site.build(&cli.site, &MarkdownRenderer)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", cli.site.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise info, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "static_i18n=debug"
    } else {
        "static_i18n=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Caps the rayon pool when `--jobs` is given; can only constrain down.
fn init_thread_pool(jobs: Option<usize>) {
    let Some(jobs) = jobs else { return };
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.clamp(1, cores))
        .build_global()
        .ok();
}
