//! Wiki Expander CLI
//!
//! Usage:
//!   wiki-expander [OPTIONS] [FILE]
//!
//! Options:
//!   --html                 Render HTML instead of the JSON token list
//!   -d, --debug            Trace expansion to stderr
//!   -c, --config <FILE>    Parser configuration (TOML format)
//!   --no-fetch             Only use preloaded templates
//!   --script-path <URL>    Base URL of the wiki's script directory
//!   -h, --help             Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wiki_expander::{render_html, Error, ParserConfig, Token, WikiParser};

#[derive(Parser)]
#[command(name = "wiki-expander")]
#[command(about = "Expand templates in wikitext")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Render HTML instead of the JSON token list
    #[arg(long)]
    html: bool,

    /// Debug mode: trace expansion to stderr
    #[arg(short, long)]
    debug: bool,

    /// Parser configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Never fetch templates over the network
    #[arg(long)]
    no_fetch: bool,

    /// Base URL of the wiki's script directory
    #[arg(long)]
    script_path: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String, Error> {
    // Load configuration
    let mut config = match &cli.config {
        Some(path) => ParserConfig::from_file(path)?,
        None => ParserConfig::default(),
    };
    if cli.no_fetch {
        config = config.with_fetch_templates(false);
    }
    if let Some(script_path) = &cli.script_path {
        config = config.with_script_path(script_path.as_str());
    }

    let source = read_source(cli.input.as_deref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let parser = WikiParser::from_config(config)?;
        let tokens = parser.expand(&source).await;
        render(&tokens, cli.html)
    })
}

/// Read the document from a file, or from stdin when no path is given
fn read_source(path: Option<&Path>) -> Result<String, Error> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn render(tokens: &[Token], html: bool) -> Result<String, Error> {
    if html {
        Ok(render_html(tokens))
    } else {
        Ok(serde_json::to_string_pretty(tokens)?)
    }
}
