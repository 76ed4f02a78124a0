use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use sitefill::config::{self, ContentSize, RunConfig, RunSettings};
use sitefill::{check, generate, logging, output, plan};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Run shape flags shared by `generate` and `plan`.
#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Total number of entries to create, sections included (min 100)
    #[arg(long)]
    num_pages: Option<usize>,

    /// Fixed content size in kB for every document
    #[arg(long, conflicts_with_all = ["min_size_kb", "max_size_kb"])]
    size_kb: Option<usize>,

    /// Minimum content size in kB (sampled from [min, max))
    #[arg(long)]
    min_size_kb: Option<usize>,

    /// Maximum content size in kB (exclusive)
    #[arg(long)]
    max_size_kb: Option<usize>,

    /// Write pages as leaf bundles (bundleN/index.md)
    #[arg(long)]
    bundle: bool,

    /// Maximum number of documents written concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Seed for content sizes and section assignment
    #[arg(long)]
    seed: Option<u64>,

    /// Keep writing after a failure and report all failures at the end
    #[arg(long)]
    keep_going: bool,

    /// Existing directory to write the content/ tree into
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser)]
#[command(name = "sitefill")]
#[command(about = "Generate synthetic content trees for static site build benchmarks")]
#[command(long_about = "\
Generate synthetic content trees for static site build benchmarks

Writes a tree of sections and markdown pages filled with lorem text:

  <out-dir>/content/
  ├── section0/
  │   ├── _index.md                # Section index
  │   ├── page12.md                # Page (flat mode)
  │   └── bundle12/index.md        # Page (--bundle mode)
  └── section1/
      └── ...

The page budget is split into max(pages / 500, 5) sections; the rest are
pages, each assigned to a random section. Any existing content/ directory
under the output directory is removed first.

Run 'sitefill gen-config' to print a documented run.toml.")]
#[command(version)]
struct Cli {
    /// Run configuration file (TOML); command-line flags take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clear <out-dir>/content and generate a new tree
    Generate(RunArgs),
    /// Show the section/page split and layout without writing anything
    Plan {
        #[command(flatten)]
        run: RunArgs,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify an existing tree's layout and front matter
    Check {
        /// Directory holding the content/ tree
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Print a stock run.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Generate(args) => {
            let config = resolve_config(cli.config.as_deref(), args);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_generate_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = generate::generate(&config, Some(tx));
            let _ = printer.join();
            output::print_summary(&result?);
        }
        Command::Plan { run: args, json } => {
            let config = resolve_config(cli.config.as_deref(), args);
            let plan = plan::Plan::new(&config);
            if *json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_plan(&plan);
            }
        }
        Command::Check { out_dir } => {
            let stats = check::check(out_dir)?;
            output::print_check(&stats, out_dir);
            if !stats.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Layer config file and flags into a validated [`RunConfig`].
///
/// Invalid input is a usage error: reported through clap and exits
/// before any work starts.
fn resolve_config(config_path: Option<&Path>, args: &RunArgs) -> RunConfig {
    let settings = match config_path {
        Some(path) => config::load_settings(path),
        None => config::resolve_settings(None),
    };
    let settings = settings.unwrap_or_else(|e| usage_error(&e.to_string()));
    let config = RunConfig::new(apply_flags(settings, args), &args.out_dir);
    if let Err(e) = config.validate() {
        usage_error(&e.to_string());
    }
    config
}

fn apply_flags(mut settings: RunSettings, args: &RunArgs) -> RunSettings {
    if let Some(n) = args.num_pages {
        settings.num_pages = n;
    }
    settings.content = ContentSize::from_flags(
        settings.content,
        args.size_kb,
        args.min_size_kb,
        args.max_size_kb,
    );
    settings.bundle |= args.bundle;
    settings.keep_going |= args.keep_going;
    if let Some(w) = args.workers {
        settings.workers = w;
    }
    if let Some(s) = args.seed {
        settings.seed = s;
    }
    settings
}

fn usage_error(message: &str) -> ! {
    Cli::command()
        .error(ErrorKind::ValueValidation, message)
        .exit()
}
