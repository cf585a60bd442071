//! `contentops` command-line entry point.
//!
//! Every command prints one JSON document to stdout. Validation failures
//! print their summary and exit with status 1; other failures exit with 2.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Command, CreateArgs, InputArgs, IssuesArgs, ModeArg, RootArgs};
use contentops_core::{
    default_log_level, init_logging, open_db, open_db_in_memory, validate_create,
    validate_promote, ContentInput, ContentListQuery, ContentPatch, ContentService,
    ContentServiceError, CreateContentRequest, LogAuditSink, SqliteContentRepository,
    StructuredInput,
};
use log::info;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: RootArgs) -> Result<ExitCode> {
    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    if let Command::Validate(validate) = &args.command {
        let input = read_input(&validate.input)?;
        let summary = match validate.mode {
            ModeArg::Create => validate_create(validate.input.kind, &input),
            ModeArg::Promote => validate_promote(validate.input.kind, &input),
        };
        print_json(&summary)?;
        return Ok(if summary.ok {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    let conn = if args.db.as_os_str() == ":memory:" {
        open_db_in_memory()
    } else {
        open_db(&args.db)
    }
    .with_context(|| format!("failed to open content store `{}`", args.db.display()))?;
    let repo = SqliteContentRepository::try_new(&conn)?;
    let service = ContentService::new(repo, LogAuditSink);
    info!("event=cli_command module=cli status=start");

    let result = match args.command {
        Command::Validate(_) => return Ok(ExitCode::SUCCESS),
        Command::Create(create) => {
            let request = create_request(create)?;
            service.create(request).map(|outcome| to_json(&outcome))
        }
        Command::ImportCsv(import) => {
            let text = read_text(&import.file)?;
            service
                .import_project_notes_csv(&text, import.source)
                .map(|report| to_json(&report))
        }
        Command::Transition(transition) => service
            .transition_status(transition.id, transition.status)
            .map(|item| to_json(&item)),
        Command::Update(update) => {
            let text = read_text(&update.patch)?;
            let patch: ContentPatch =
                serde_json::from_str(&text).context("patch is not a valid JSON object")?;
            service
                .update_fields(update.id, patch)
                .map(|item| to_json(&item))
        }
        Command::Issues(issues) => service
            .promotion_report(&list_query(&issues))
            .map(|report| to_json(&report)),
    };

    match result {
        Ok(json) => {
            println!("{}", json?);
            Ok(ExitCode::SUCCESS)
        }
        Err(ContentServiceError::Validation(summary)) => {
            print_json(&summary)?;
            Ok(ExitCode::from(1))
        }
        Err(err) => Err(err.into()),
    }
}

fn create_request(args: CreateArgs) -> Result<CreateContentRequest> {
    let input = read_input(&args.input)?;
    let mut request = CreateContentRequest::new(args.input.kind).with_status(args.status);
    request.raw_input = input.raw_input;
    request.structured = input.structured;
    request.title = args.title;
    request.source = args.source;
    request.cadence_target = args.cadence;
    request.topics = args.topics;
    request.related_slugs = args.related_slugs;
    Ok(request)
}

fn read_input(args: &InputArgs) -> Result<ContentInput> {
    let raw_input = args.raw.as_deref().map(read_text).transpose()?;
    let structured = match args.structured.as_deref() {
        Some(path) => {
            let text = read_text(path)?;
            let value = serde_json::from_str(&text)
                .with_context(|| format!("`{}` is not valid JSON", path.display()))?;
            Some(StructuredInput::Json(value))
        }
        None => None,
    };
    Ok(ContentInput {
        raw_input,
        structured,
    })
}

fn list_query(args: &IssuesArgs) -> ContentListQuery {
    ContentListQuery {
        kind: args.kind,
        status: args.status,
        limit: Some(args.limit),
        offset: args.offset,
    }
}

fn read_text(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to encode output")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}
