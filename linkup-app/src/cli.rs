use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use linkup_sdk::{FetchOptions, LinkupClient, SearchDepth, SearchOptions, StructuredOutput};
use serde_json::Value;

/// Query the Linkup search API from the command line.
#[derive(Debug, Parser)]
#[command(name = "linkup", version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML, TOML or JSON); missing files are ignored
    #[arg(long, env = "LINKUP_CONFIG", default_value = "linkup.yaml")]
    pub config: PathBuf,

    /// Mirror logs to stderr as well as the log file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Text and image results for a query
    Search(SearchArgs),
    /// An answer with the sources it was built from
    Answer(SearchArgs),
    /// Output shaped by a JSON Schema file
    Structured {
        #[command(flatten)]
        search: SearchArgs,
        /// Path to the JSON Schema the output must follow
        #[arg(long, value_name = "PATH")]
        schema: PathBuf,
    },
    /// A single page as markdown
    Fetch {
        url: String,
        #[arg(long)]
        render_js: bool,
        #[arg(long)]
        raw_html: bool,
        #[arg(long)]
        images: bool,
    },
    /// Remaining account credits
    Balance,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Depth {
    #[default]
    Standard,
    Deep,
}

impl From<Depth> for SearchDepth {
    fn from(depth: Depth) -> Self {
        match depth {
            Depth::Standard => SearchDepth::Standard,
            Depth::Deep => SearchDepth::Deep,
        }
    }
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub query: String,

    #[arg(long, value_enum, default_value_t = Depth::Standard)]
    pub depth: Depth,

    /// Restrict results to these domains (repeatable)
    #[arg(long = "include-domain", value_name = "DOMAIN")]
    pub include_domains: Vec<String>,

    /// Drop results from these domains (repeatable)
    #[arg(long = "exclude-domain", value_name = "DOMAIN")]
    pub exclude_domains: Vec<String>,

    /// Earliest publication date, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest publication date, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long)]
    pub images: bool,

    #[arg(long)]
    pub citations: bool,

    #[arg(long)]
    pub sources: bool,

    #[arg(long)]
    pub max_results: Option<f64>,
}

impl SearchArgs {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            exclude_domains: self.exclude_domains.clone(),
            include_domains: self.include_domains.clone(),
            from_date: self.from,
            to_date: self.to,
            include_images: self.images,
            include_inline_citations: self.citations,
            include_sources: self.sources,
            max_results: self.max_results,
        }
    }
}

/// Run one subcommand and return what should be printed.
pub async fn run(client: &LinkupClient, command: Command) -> Result<String> {
    let out = match command {
        Command::Search(args) => {
            let results = client
                .get_search_results(&args.query, args.depth.into(), Some(&args.options()))
                .await?;
            serde_json::to_string_pretty(&results)?
        }
        Command::Answer(args) => {
            let answer = client
                .get_sourced_answer(&args.query, args.depth.into(), Some(&args.options()))
                .await?;
            serde_json::to_string_pretty(&answer)?
        }
        Command::Structured {
            search,
            schema: schema_path,
        } => {
            let raw = std::fs::read_to_string(&schema_path)
                .with_context(|| format!("reading schema {}", schema_path.display()))?;
            let schema: Value = serde_json::from_str(&raw)
                .with_context(|| format!("parsing schema {}", schema_path.display()))?;
            let output = client
                .get_structured_results(
                    &search.query,
                    search.depth.into(),
                    &schema,
                    Some(&search.options()),
                )
                .await?;
            match output {
                StructuredOutput::RawJson(body) => body,
                StructuredOutput::Sourced(sourced) => serde_json::to_string_pretty(&sourced)?,
            }
        }
        Command::Fetch {
            url,
            render_js,
            raw_html,
            images,
        } => {
            let opts = FetchOptions {
                extract_images: images,
                include_raw_html: raw_html,
                render_js,
            };
            let page = client.fetch(&url, Some(&opts)).await?;
            serde_json::to_string_pretty(&page)?
        }
        Command::Balance => client.get_balance().await?.to_string(),
    };
    Ok(out)
}
