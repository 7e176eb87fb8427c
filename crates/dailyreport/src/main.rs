//! `dreport` - CLI for dailyreport
//!
//! This binary manages a notes/reports workspace: scratch notes, daily
//! report generation through a completion API, weekly summaries and git
//! synchronization.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::Parser;

use dailyreport::cli::{
    Cli, Command, ConfigCommand, DeleteCommand, GenerateCommand, HistoryCommand, ListCommand,
    NewCommand, StatsCommand, SyncCommand, WeeklyCommand,
};
use dailyreport::{
    filter_entries, format_file_size, generate_report, init_logging, write_weekly_summary, Config,
    GenerateOutcome, GenerateRequest, GitSync, IsoWeek, Ledger, TextStats, Workspace,
};

/// Exit status when the input note does not exist.
const EXIT_INPUT_NOT_FOUND: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let input_missing = err
                .downcast_ref::<dailyreport::Error>()
                .is_some_and(dailyreport::Error::is_input_not_found);
            if input_missing {
                ExitCode::from(EXIT_INPUT_NOT_FOUND)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // `config validate` reports problems itself instead of failing on load.
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        return handle_validate(file.clone().or_else(|| cli.config.clone()));
    }

    let config_path = Config::resolve_path(cli.config.clone());
    let mut config =
        Config::load_from(Some(config_path.clone())).context("loading configuration")?;
    if let Some(root) = cli.workspace {
        config.workspace.root = Some(root);
    }

    match cli.command {
        Command::New(cmd) => handle_new(&config, &cmd),
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Delete(cmd) => handle_delete(&config, &cmd),
        Command::Generate(cmd) => handle_generate(&config, cmd).await,
        Command::Weekly(cmd) => handle_weekly(&config, cmd),
        Command::History(cmd) => handle_history(&config, &cmd),
        Command::Sync(cmd) => handle_sync(&config, &cmd),
        Command::Stats(cmd) => handle_stats(&cmd),
        Command::Config(cmd) => handle_config(&config, &config_path, &cmd),
    }
}

fn handle_new(config: &Config, cmd: &NewCommand) -> anyhow::Result<()> {
    let workspace = Workspace::from_config(config);
    let date = cmd.date.unwrap_or_else(|| Local::now().date_naive());
    let path = workspace.create_scratch_note(&cmd.name, date)?;
    println!("{}", path.display());
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let workspace = Workspace::from_config(config);
    let entries = filter_entries(
        workspace.list(cmd.kind.into())?,
        cmd.filter.as_deref().unwrap_or_default(),
    );

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No files found.");
        return Ok(());
    }
    for entry in &entries {
        let modified = entry.modified.format("%Y-%m-%d %H:%M");
        let size = format_file_size(entry.size);
        match &entry.title {
            Some(title) => println!("{modified}  {size:>8}  {}  {title}", entry.name),
            None => println!("{modified}  {size:>8}  {}", entry.name),
        }
    }
    Ok(())
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<()> {
    let workspace = Workspace::from_config(config);
    for name in &cmd.names {
        let path = workspace.delete_entry(cmd.kind.into(), name)?;
        println!("Deleted {}", path.display());
    }
    Ok(())
}

async fn handle_generate(config: &Config, cmd: GenerateCommand) -> anyhow::Result<()> {
    let request = GenerateRequest {
        input: cmd.input,
        output: cmd.output,
        date: cmd.date,
        source_type: cmd.source_type.into(),
        source_id: cmd.source_id,
        force: cmd.force,
    };

    match generate_report(config, &request).await? {
        GenerateOutcome::Generated { output, bytes } => {
            let size = format_file_size(u64::try_from(bytes).unwrap_or(u64::MAX));
            println!("Generated {} ({size})", output.display());
        }
        GenerateOutcome::Skipped { output } => {
            println!("Unchanged, kept {} (use --force to regenerate)", output.display());
        }
    }
    Ok(())
}

fn handle_weekly(config: &Config, cmd: WeeklyCommand) -> anyhow::Result<()> {
    let current = IsoWeek::containing(Local::now().date_naive());
    let week = IsoWeek::new(
        cmd.year.unwrap_or(current.year()),
        cmd.week.unwrap_or(current.week()),
    )?;

    let path = write_weekly_summary(&Workspace::from_config(config), week, cmd.output)?;
    println!("{}", path.display());
    Ok(())
}

fn handle_history(config: &Config, cmd: &HistoryCommand) -> anyhow::Result<()> {
    let ledger = Ledger::open(config.ledger_path()).context("opening generation ledger")?;
    if let Some(days) = cmd.prune {
        let removed = ledger.prune_older_than(days)?;
        println!("Pruned {removed} entries older than {days} days.");
    }
    let generations = ledger.recent(cmd.limit)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&generations)?);
        return Ok(());
    }

    if generations.is_empty() {
        println!("No reports generated yet.");
        return Ok(());
    }
    for generation in &generations {
        println!(
            "{}  {}  {} <- {}",
            generation.generated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            generation.report_date,
            generation.output_path.display(),
            generation.source_path.display()
        );
    }
    Ok(())
}

fn handle_sync(config: &Config, cmd: &SyncCommand) -> anyhow::Result<()> {
    let git = GitSync::new(config.workspace_root())?;
    let report = git.sync(&cmd.message)?;
    for step in &report.steps {
        println!("git {step}");
    }
    if !report.committed {
        println!("Nothing to commit.");
    }
    Ok(())
}

fn handle_stats(cmd: &StatsCommand) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("reading {}", cmd.file.display()))?;
    let size = std::fs::metadata(&cmd.file)?.len();
    let stats = TextStats::of(&text);

    if cmd.json {
        let value = serde_json::json!({
            "file": cmd.file,
            "words": stats.words,
            "lines": stats.lines,
            "reading_minutes": stats.reading_minutes,
            "size": size,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("File:          {}", cmd.file.display());
        println!("Words:         {}", stats.words);
        println!("Lines:         {}", stats.lines);
        println!("Reading time:  ~{} min", stats.reading_minutes);
        println!("Size:          {}", format_file_size(size));
    }
    Ok(())
}

fn handle_config(config: &Config, config_path: &Path, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let mut shown = config.clone();
            if shown.api.key.is_some() {
                shown.api.key = Some("********".to_string());
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Workspace]");
                println!("  Root:               {}", shown.workspace_root().display());
                println!("  Notes dir:          {}", shown.workspace.notes_dir.display());
                println!("  Daily dir:          {}", shown.workspace.daily_dir.display());
                println!("  Weekly dir:         {}", shown.workspace.weekly_dir.display());
                println!();
                println!("[API]");
                println!("  URL:                {}", shown.api.url.as_deref().unwrap_or("(unset)"));
                println!("  Key:                {}", shown.api.key.as_deref().unwrap_or("(unset)"));
                println!("  Model:              {}", shown.api.model.as_deref().unwrap_or("(unset)"));
                println!("  Timeout (s):        {}", shown.api.timeout);
                println!("  Response paths:     {}", shown.response_paths().join(", "));
                println!();
                println!("[Generation]");
                println!("  Strip think:        {}", shown.generation.strip_think);
                println!("  Temperature:        {}", shown.generation.temperature);
                println!("  Top p:              {}", shown.generation.top_p);
                println!(
                    "  System prompt:      {}",
                    if shown.generation.system_prompt.is_some() { "custom" } else { "default" }
                );
                println!();
                println!("[Ledger]");
                println!("  Database path:      {}", shown.ledger_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", config_path.display());
        }
        ConfigCommand::Validate { file } => return handle_validate(file.clone()),
    }
    Ok(())
}

fn handle_validate(file: Option<PathBuf>) -> anyhow::Result<()> {
    let path = Config::resolve_path(file);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => {
            println!("Configuration is valid.");
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("configuration is invalid")),
    }
}
