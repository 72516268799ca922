//! Stencil CLI
//!
//! Usage:
//!   stencil [OPTIONS] [FILE]
//!
//! Options:
//!   -d, --data <FILE>        TOML data to fill the template with
//!   -t, --templates <PATH>   Named template file or directory
//!   -c, --config <FILE>      Configuration file (TOML format)
//!   -j, --join <TEXT>        Default separator for lists
//!   --check                  Only check that the template compiles
//!   -v, --verbose            Log what the engine does to stderr
//!   -h, --help               Print help

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use stencil::data::{load_data, provider_from_table};
use stencil::{
    load_templates, Config, Environment, FillError, Provider, Template, TemplateRegistry,
};

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Fill text templates from TOML data")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// TOML data file whose top-level table is the root provider
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Named template file, or a directory of them
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default separator between list elements
    #[arg(short, long)]
    join: Option<String>,

    /// Only check that the template compiles
    #[arg(long)]
    check: bool,

    /// Log engine activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(join) = cli.join {
        config.engine.default_join = join;
    }

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let template = Template::new(source);
    if let Err(e) = template.compile() {
        eprint!("{}", e.format(template.source(), &filename));
        std::process::exit(1);
    }
    if cli.check {
        return;
    }

    let templates = match cli.templates.as_ref().or(config.templates.as_ref()) {
        Some(path) => load_named_templates(path),
        None => TemplateRegistry::new(),
    };

    let data = match cli.data.as_ref().or(config.data.as_ref()) {
        Some(path) => match load_data(path) {
            Ok(table) => Some(table),
            Err(e) => {
                eprintln!("Error loading data '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => None,
    };
    let root = match &data {
        Some(table) => provider_from_table(table),
        None => Provider::empty(),
    };

    let env = Environment::new()
        .with_templates(templates)
        .with_config(config.engine);
    match env.fill(&template, root) {
        Ok(text) => {
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
                eprintln!("Error writing output: {}", e);
                std::process::exit(1);
            }
        }
        Err(FillError::Compile(e)) => {
            eprintln!("Error in named template: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprint!("Error: {}", e.pretty());
            std::process::exit(1);
        }
    }
}

fn load_named_templates(path: &Path) -> TemplateRegistry {
    match load_templates(path) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error loading templates '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
