use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use shelf_index::{FileStatus, StatusCode};
use shelf_worktree::Repository;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let dir = match cli.repo {
        Some(dir) => dir,
        None => dirs::home_dir()
            .context("could not find home directory")?
            .join(".shelf"),
    };
    let root = cli.root;

    match cli.command {
        Command::Init => cmd_init(dir, root),
        Command::Track(args) => cmd_track(open(&dir, &root)?, args),
        Command::Add(args) => cmd_add(open(&dir, &root)?, args),
        Command::Status(args) => cmd_status(open(&dir, &root)?, args),
        Command::Commit(args) => cmd_commit(open(&dir, &root)?, args),
        Command::Log(args) => cmd_log(open(&dir, &root)?, args),
    }
}

fn open(dir: &Path, root: &Path) -> anyhow::Result<Repository> {
    Repository::open(dir, root)
        .with_context(|| format!("cannot open repository at {}", dir.display()))
}

fn cmd_init(dir: PathBuf, root: PathBuf) -> anyhow::Result<()> {
    let repo = Repository::init(&dir, &root)?;
    println!(
        "{} Initialized shelf repository in {}",
        "✓".green().bold(),
        repo.dir().display().to_string().bold()
    );
    println!("  Root: {}", repo.root().display().to_string().cyan());
    Ok(())
}

fn cmd_track(mut repo: Repository, args: TrackArgs) -> anyhow::Result<()> {
    for path in &args.paths {
        if repo.track(path)? {
            println!("  {} {}", "tracking:".green(), path.display());
        }
    }
    for root in repo.config().roots() {
        println!("{}", display_path(&repo, root));
    }
    Ok(())
}

fn cmd_add(mut repo: Repository, args: AddArgs) -> anyhow::Result<()> {
    for path in &args.paths {
        let outcome = repo.add(path)?;
        let label = if outcome.changed { "staged:".green() } else { "unchanged:".dimmed() };
        println!(
            "{} {} {}",
            outcome.hash.to_hex().yellow(),
            label,
            display_path(&repo, &outcome.path)
        );
    }
    Ok(())
}

fn cmd_status(repo: Repository, args: StatusArgs) -> anyhow::Result<()> {
    let status = repo.status()?;
    if args.short {
        print!("{status}");
        return Ok(());
    }
    if status.is_clean() {
        println!("Nothing to commit, tracked paths clean.");
        return Ok(());
    }
    for (path, file) in status.iter() {
        println!("  {} {}", colored_codes(file), display_path(&repo, path));
    }
    Ok(())
}

fn cmd_commit(mut repo: Repository, args: CommitArgs) -> anyhow::Result<()> {
    let author = args
        .author
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "unknown".to_string());
    let id = repo.commit(&args.message, &author)?;
    println!("{} Committed {}", "✓".green().bold(), id.short_hex().yellow());
    println!("  {}", args.message);
    Ok(())
}

fn cmd_log(repo: Repository, args: LogArgs) -> anyhow::Result<()> {
    let history = repo.log()?;
    if history.is_empty() {
        println!("No commits yet.");
        return Ok(());
    }
    let limit = args.limit.unwrap_or(usize::MAX);
    for (id, commit) in history.iter().take(limit) {
        if args.oneline {
            println!("{} {}", id.short_hex().yellow(), commit.message);
        } else {
            println!("{} {}", "commit".yellow(), id.to_hex().yellow());
            println!("Author: {}", commit.author);
            println!("Date:   {}", commit.timestamp.to_rfc3339());
            println!("\n    {}\n", commit.message);
        }
    }
    Ok(())
}

fn colored_codes(file: &FileStatus) -> String {
    let paint = |code: StatusCode, staged: bool| {
        let c = code.code().to_string();
        match code {
            StatusCode::Unmodified => c.normal(),
            StatusCode::Untracked => c.red(),
            _ if staged => c.green(),
            _ => c.red(),
        }
    };
    format!("{}{}", paint(file.staging, true), paint(file.worktree, false))
}

/// Canonical paths are printed as absolute filesystem paths.
fn display_path(repo: &Repository, canonical: &str) -> String {
    if canonical.is_empty() {
        return repo.root().display().to_string();
    }
    repo.root().join(canonical).display().to_string()
}
