use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use notelinker_expand::{
    expand_once, BufferHost, ExpansionOutcome, IssueResult, MemoryHost, StaticIssueSearcher,
};
use notelinker_settings::SettingsStore;
use notelinker_triggers::{
    format_date, rewrite_line, rewrite_name, today, DateFormat, LineAction, PatternSet,
};
use serde::Deserialize;

const SETTINGS_DIR: &str = ".notelinker";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Parser)]
#[command(
    name = "notelinker-cli",
    about = "Batch trigger expansion for NoteLinker documents",
    author,
    version
)]
struct Cli {
    /// Workspace root holding `.notelinker/settings.json`; defaults to the
    /// current directory.
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one rewrite pass per line: strip escapes, substitute date
    /// triggers.
    Rewrite(RewriteArgs),
    /// Rewrite file names containing triggers and rename the files.
    Rename(RenameArgs),
    /// Resolve pending [[JIRA:…]] placeholders against an issue fixture
    /// table.
    Expand(ExpandArgs),
    /// Inspect or initialise workspace settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args)]
struct RewriteArgs {
    /// Input files to rewrite.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Date format token (for example `MM/DD/YYYY`). Unrecognised tokens
    /// fall back to the workspace settings, then to `YYYY-MM-DD`.
    #[arg(long, value_name = "TOKEN")]
    format: Option<String>,

    /// Substitute this date instead of today (ISO `YYYY-MM-DD`).
    #[arg(long, value_name = "DATE")]
    date: Option<String>,

    /// Rewrite the files in place instead of printing to stdout.
    #[arg(long)]
    in_place: bool,
}

#[derive(Args)]
struct RenameArgs {
    /// Files whose names should be rewritten.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    #[arg(long, value_name = "TOKEN")]
    format: Option<String>,

    #[arg(long, value_name = "DATE")]
    date: Option<String>,

    /// Report the renames without performing them.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct ExpandArgs {
    /// Input file containing placeholders.
    input: PathBuf,

    /// JSON array of issues: `[{"key": "…", "summary": "…"}]`.
    #[arg(long, value_name = "PATH")]
    issues: PathBuf,

    /// Rewrite the file in place instead of printing to stdout.
    #[arg(long)]
    in_place: bool,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Write default settings into the workspace if none exist yet.
    Init,
    /// Print the effective settings as JSON.
    Show,
}

#[derive(Debug, Deserialize)]
struct IssueFixture {
    key: String,
    summary: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let workspace = cli
        .workspace
        .clone()
        .map_or_else(std::env::current_dir, Ok)
        .context("failed to resolve the workspace directory")?;

    match cli.command {
        Commands::Rewrite(args) => run_rewrite(&workspace, args),
        Commands::Rename(args) => run_rename(&workspace, args),
        Commands::Expand(args) => run_expand(args),
        Commands::Settings(command) => run_settings(&workspace, command),
    }
}

fn settings_path(workspace: &Path) -> PathBuf {
    workspace.join(SETTINGS_DIR).join(SETTINGS_FILE)
}

/// Resolves the replacement date string: explicit flags first, then the
/// workspace settings, then today in ISO layout.
fn resolve_replacement(
    workspace: &Path,
    format: Option<&str>,
    date: Option<&str>,
) -> Result<String> {
    let format = match format.and_then(DateFormat::parse_token) {
        Some(format) => format,
        None => SettingsStore::load(settings_path(workspace))
            .map(|store| store.settings().date_format)
            .unwrap_or_default(),
    };
    let date = match date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --date value: {raw}"))?,
        None => today(),
    };
    Ok(format_date(date, format))
}

fn run_rewrite(workspace: &Path, args: RewriteArgs) -> Result<()> {
    if !args.in_place && args.inputs.len() > 1 {
        bail!("rewriting more than one file requires --in-place");
    }
    let replacement = resolve_replacement(workspace, args.format.as_deref(), args.date.as_deref())?;

    for input in &args.inputs {
        let contents = fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        let rewritten = rewrite_text(&contents, &replacement);
        if args.in_place {
            fs::write(input, rewritten)
                .with_context(|| format!("failed to write {}", input.display()))?;
        } else {
            print!("{rewritten}");
        }
    }
    Ok(())
}

/// One rewrite event per line; the caret is pinned to the start of the line
/// so the asynchronous lookup pass never fires here.
fn rewrite_text(contents: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(contents.len());
    for line in contents.lines() {
        match rewrite_line(line, 0, replacement) {
            Some(LineAction::Edit(edit)) => out.push_str(&edit.text),
            _ => out.push_str(line),
        }
        out.push('\n');
    }
    if !contents.ends_with('\n') && !out.is_empty() {
        out.pop();
    }
    out
}

fn run_rename(workspace: &Path, args: RenameArgs) -> Result<()> {
    let replacement = resolve_replacement(workspace, args.format.as_deref(), args.date.as_deref())?;
    let mut failures = 0usize;

    for path in &args.paths {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?;
        let edit = rewrite_name(name, &replacement);
        if !edit.changed {
            println!("{}: unchanged", path.display());
            continue;
        }

        let target = path.with_file_name(&edit.text);
        if args.dry_run {
            println!("{} -> {}", path.display(), target.display());
            continue;
        }
        match fs::rename(path, &target) {
            Ok(()) => println!("{} -> {}", path.display(), target.display()),
            Err(err) => {
                // Report and keep going; the rewritten name is not retried.
                eprintln!("failed to rename {}: {err}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} rename(s) failed");
    }
    Ok(())
}

fn run_expand(args: ExpandArgs) -> Result<()> {
    let searcher = load_fixture(&args.issues)?;
    let contents = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let had_trailing_newline = contents.ends_with('\n');

    let mut host = MemoryHost::from_text(&contents);
    let line_count = host.lines().len();
    for index in 0..line_count {
        expand_pending_on_line(&mut host, &searcher, index);
    }

    for notice in host.drain_notices() {
        eprintln!("{notice}");
    }

    let mut rewritten = host.into_lines().join("\n");
    if had_trailing_newline {
        rewritten.push('\n');
    }
    if args.in_place {
        fs::write(&args.input, rewritten)
            .with_context(|| format!("failed to write {}", args.input.display()))?;
    } else {
        print!("{rewritten}");
    }
    Ok(())
}

/// Resolves placeholders on one line until none remain or each surviving
/// payload has failed once. Empty and failed lookups revert the line, so the
/// payload must be parked to guarantee progress.
fn expand_pending_on_line(host: &mut MemoryHost, searcher: &StaticIssueSearcher, index: usize) {
    let mut parked: HashSet<String> = HashSet::new();
    loop {
        let Some(line) = host.line(index) else {
            return;
        };
        let next = PatternSet::standard()
            .pending_lookups(&line)
            .into_iter()
            .find(|pending| !parked.contains(&pending.payload));
        let Some(pending) = next else {
            return;
        };
        match expand_once(host, searcher, index, pending.span, &pending.payload) {
            Some(ExpansionOutcome::Resolved { .. }) => {}
            _ => {
                parked.insert(pending.payload);
            }
        }
    }
}

fn load_fixture(path: &Path) -> Result<StaticIssueSearcher> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read issue fixture {}", path.display()))?;
    let fixtures: Vec<IssueFixture> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse issue fixture {}", path.display()))?;

    let issues = fixtures
        .into_iter()
        .map(|fixture| {
            let mut issue = IssueResult::new(fixture.key, fixture.summary);
            if let Some(status) = fixture.status {
                issue = issue.with_status(status);
            }
            if let Some(priority) = fixture.priority {
                issue = issue.with_priority(priority);
            }
            if let Some(url) = fixture.url {
                issue = issue.with_url(url);
            }
            issue
        })
        .collect();
    Ok(StaticIssueSearcher::new(issues))
}

fn run_settings(workspace: &Path, command: SettingsCommand) -> Result<()> {
    let path = settings_path(workspace);
    match command {
        SettingsCommand::Init => {
            if path.exists() {
                bail!("settings already exist at {}", path.display());
            }
            let store = SettingsStore::load(&path)?;
            store.save()?;
            println!("wrote {}", path.display());
            Ok(())
        }
        SettingsCommand::Show => {
            let store = SettingsStore::load(&path)?;
            let json = serde_json::to_string_pretty(store.settings())
                .context("failed to render settings")?;
            println!("{json}");
            Ok(())
        }
    }
}
