use clap::{Args, Parser, Subcommand, ValueEnum};
use jsongraph_core::config::IdSynthesis;
use jsongraph_core::LogFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jsongraph", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log build internals to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Format of log lines on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Plain)]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the graph for a document and print it as JSON
    Build(BuildArgs),

    /// List the entities found in a document with their node counts
    Entities(EntitiesArgs),
}

/// Input and build options shared by every subcommand. Flags override the
/// values loaded from configuration.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Document to read, or `-` for stdin
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Configuration file to load instead of config/default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit one proxy node per array element
    #[arg(long, overrides_with = "no_separate_array_nodes")]
    pub separate_array_nodes: bool,

    /// Link array items straight from the summary node, even if configured otherwise
    #[arg(long, overrides_with = "separate_array_nodes")]
    pub no_separate_array_nodes: bool,

    /// Field whose equal values get linked (repeatable)
    #[arg(long = "link", value_name = "FIELD")]
    pub linked_fields: Vec<String>,

    /// How ids are made up for objects without an identity field
    #[arg(long, value_enum)]
    pub id_synthesis: Option<IdSynthesisArg>,

    /// Maximum nesting depth before the build is refused
    #[arg(long)]
    pub max_depth: Option<usize>,
}

impl InputArgs {
    /// Array mode requested on the command line, if any. The last of the two
    /// opposing flags wins.
    pub fn separate_array_nodes(&self) -> Option<bool> {
        if self.separate_array_nodes {
            Some(true)
        } else if self.no_separate_array_nodes {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Pretty-print the graph
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct EntitiesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSynthesisArg {
    Positional,
    Scoped,
}

impl From<IdSynthesisArg> for IdSynthesis {
    fn from(arg: IdSynthesisArg) -> Self {
        match arg {
            IdSynthesisArg::Positional => IdSynthesis::Positional,
            IdSynthesisArg::Scoped => IdSynthesis::Scoped,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Plain,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Plain => LogFormat::Plain,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
