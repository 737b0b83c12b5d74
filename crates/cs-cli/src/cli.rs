//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cardsmith - validate and save BI card query definitions
#[derive(Parser, Debug)]
#[command(name = "cs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to cardsmith.yml (default: look in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the BI platform, used when no config file is given
    #[arg(short, long, global = true)]
    pub url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve a shaped card definition
    Get(GetArgs),

    /// Validate and create a card
    Create(CreateArgs),

    /// Validate and apply a partial card update
    Update(UpdateArgs),

    /// Analyze a query and its parameters without contacting the platform
    Check(CheckArgs),
}

/// Declared query type
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTypeArg {
    /// SQL text with {{placeholders}}
    Native,
    /// MBQL JSON object
    Query,
}

impl QueryTypeArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryTypeArg::Native => "native",
            QueryTypeArg::Query => "query",
        }
    }
}

/// Query text given inline or read from a file
#[derive(Args, Debug, Clone, Default)]
pub struct QuerySource {
    /// SQL text, or MBQL as JSON
    #[arg(short, long, conflicts_with = "query_file")]
    pub query: Option<String>,

    /// Read the query from a file
    #[arg(long)]
    pub query_file: Option<PathBuf>,
}

impl QuerySource {
    pub fn is_given(&self) -> bool {
        self.query.is_some() || self.query_file.is_some()
    }
}

/// Arguments for the get command
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Card id
    pub id: i64,

    /// Ask the platform to skip view counting
    #[arg(long)]
    pub ignore_view: bool,

    /// Skip the SQL translation of MBQL cards
    #[arg(long)]
    pub no_translate: bool,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Database id the query runs against
    #[arg(short, long)]
    pub database: i64,

    /// Declared query type
    #[arg(short = 't', long, value_enum)]
    pub query_type: QueryTypeArg,

    #[command(flatten)]
    pub source: QuerySource,

    /// Card name
    #[arg(short, long)]
    pub name: String,

    /// Card type: question, model or metric
    #[arg(long, default_value = "question")]
    pub card_type: String,

    /// Collection id
    #[arg(long)]
    pub collection: Option<i64>,

    /// Card description
    #[arg(long)]
    pub description: Option<String>,

    /// Display type
    #[arg(long, default_value = "table")]
    pub display: String,

    /// Visualization settings as a JSON object
    #[arg(long)]
    pub visualization: Option<String>,

    /// Parameters as a JSON list
    #[arg(long)]
    pub parameters: Option<String>,
}

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Card id
    pub id: i64,

    /// Declared query type, required with a query
    #[arg(short = 't', long, value_enum)]
    pub query_type: Option<QueryTypeArg>,

    #[command(flatten)]
    pub source: QuerySource,

    /// New card name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long, conflicts_with = "description")]
    pub clear_description: bool,

    /// Move to a collection
    #[arg(long)]
    pub collection: Option<i64>,

    /// Move to the root collection
    #[arg(long, conflicts_with = "collection")]
    pub clear_collection: bool,

    /// Archive or unarchive the card
    #[arg(long)]
    pub archived: Option<bool>,

    /// New display type
    #[arg(long)]
    pub display: Option<String>,

    /// Visualization settings as a JSON object
    #[arg(long)]
    pub visualization: Option<String>,

    /// Replacement parameters as a JSON list ('[]' removes all)
    #[arg(long)]
    pub parameters: Option<String>,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Declared query type
    #[arg(short = 't', long, value_enum, default_value = "native")]
    pub query_type: QueryTypeArg,

    #[command(flatten)]
    pub source: QuerySource,

    /// Parameters as a JSON list
    #[arg(long)]
    pub parameters: Option<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
