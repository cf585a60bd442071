//! Command-line arguments for the `contentops` binary.
use clap::{Args, Parser, Subcommand, ValueEnum};
use contentops_core::{ContentKind, ContentSource, ContentStatus};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "contentops",
    version,
    about = "Typed content intake and promotion checks",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// SQLite content store
    #[arg(long, global = true, env = "CONTENTOPS_DB", default_value = "contentops.db")]
    pub db: PathBuf,

    /// Log level (trace|debug|info|warn|error); defaults by build mode
    #[arg(long, global = true, env = "CONTENTOPS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "CONTENTOPS_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a validator without touching the store
    Validate(ValidateArgs),
    /// Validate and store one item
    Create(CreateArgs),
    /// Import ProjectNote rows from a CSV file as drafts
    ImportCsv(ImportCsvArgs),
    /// Move an item to another status
    Transition(TransitionArgs),
    /// Apply a JSON field patch to an item
    Update(UpdateArgs),
    /// List items with the errors blocking their promotion
    Issues(IssuesArgs),
}

/// Raw and structured input shared by `validate` and `create`.
#[derive(Args, Debug)]
pub struct InputArgs {
    #[arg(long, value_parser = parse_kind)]
    pub kind: ContentKind,

    /// File with raw text input; `-` reads stdin
    #[arg(long, value_name = "FILE")]
    pub raw: Option<PathBuf>,

    /// File with a JSON structured payload (bare or `{kind, payload}`)
    #[arg(long, value_name = "FILE")]
    pub structured: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Create,
    Promote,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, value_enum, default_value_t = ModeArg::Create)]
    pub mode: ModeArg,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, value_parser = parse_status, default_value = "draft")]
    pub status: ContentStatus,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, value_parser = parse_source, default_value = "manual")]
    pub source: ContentSource,

    #[arg(long)]
    pub cadence: Option<String>,

    /// Topic to add; repeatable
    #[arg(long = "topic")]
    pub topics: Vec<String>,

    /// Related slug to add; repeatable
    #[arg(long = "slug")]
    pub related_slugs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ImportCsvArgs {
    /// CSV file; `-` reads stdin
    pub file: PathBuf,

    #[arg(long, value_parser = parse_source, default_value = "upload")]
    pub source: ContentSource,
}

#[derive(Args, Debug)]
pub struct TransitionArgs {
    pub id: uuid::Uuid,

    #[arg(value_parser = parse_status)]
    pub status: ContentStatus,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: uuid::Uuid,

    /// JSON patch file; `-` reads stdin
    #[arg(long, value_name = "FILE")]
    pub patch: PathBuf,
}

#[derive(Args, Debug)]
pub struct IssuesArgs {
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<ContentKind>,

    #[arg(long, value_parser = parse_status)]
    pub status: Option<ContentStatus>,

    #[arg(long, default_value_t = 50)]
    pub limit: u32,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

fn parse_kind(value: &str) -> Result<ContentKind, String> {
    ContentKind::parse(value).ok_or_else(|| format!("unknown content kind `{value}`"))
}

fn parse_status(value: &str) -> Result<ContentStatus, String> {
    ContentStatus::parse(value).ok_or_else(|| format!("unknown status `{value}`"))
}

fn parse_source(value: &str) -> Result<ContentSource, String> {
    ContentSource::parse(value).ok_or_else(|| format!("unknown source `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::{Command, RootArgs};
    use clap::Parser;
    use contentops_core::{ContentKind, ContentStatus};

    #[test]
    fn create_accepts_kind_aliases_and_repeated_topics() {
        let args = RootArgs::try_parse_from([
            "contentops",
            "create",
            "--kind",
            "field-note",
            "--raw",
            "note.txt",
            "--topic",
            "ops",
            "--topic",
            "ai",
            "--status",
            "ready",
        ])
        .unwrap();
        match args.command {
            Command::Create(create) => {
                assert_eq!(create.input.kind, ContentKind::FieldNote);
                assert_eq!(create.status, ContentStatus::Ready);
                assert_eq!(create.topics, vec!["ops", "ai"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = RootArgs::try_parse_from([
            "contentops",
            "transition",
            "6f1c2a4e-8a59-4d7a-9c53-0f0d3f5e2b11",
            "published",
        ]);
        assert!(result.is_err());
    }
}
