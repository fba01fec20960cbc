use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use themeshift_batch::{BatchOptions, BatchRunner};
use themeshift_rewrite::{ClassifierMode, Profile, RewriteEngine, DEFAULT_PROFILE};

mod discover;
mod render;

#[derive(Parser)]
#[command(name = "themeshift")]
#[command(about = "Migrate hardcoded color literals to theme tokens", long_about = None)]
#[command(version)]
struct Cli {
    /// Files to rewrite; directories are searched for `--ext` files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// TOML profile file or builtin profile name (default: builtin `material`)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// File extension to pick up inside directories (repeatable)
    #[arg(long = "ext", default_value = "dart", value_delimiter = ',')]
    extensions: Vec<String>,

    /// Override the context classifier
    #[arg(long, value_enum)]
    classifier: Option<ClassifierFlag>,

    /// Override the window classifier lookback in bytes
    #[arg(long)]
    lookback: Option<usize>,

    /// Dry run: write nothing, fail if any file would change
    #[arg(long)]
    check: bool,

    /// Print the batch report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Process files one at a time
    #[arg(long)]
    sequential: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum ClassifierFlag {
    Window,
    ScopeStack,
}

impl ClassifierFlag {
    const fn as_domain(self) -> ClassifierMode {
        match self {
            ClassifierFlag::Window => ClassifierMode::Window,
            ClassifierFlag::ScopeStack => ClassifierMode::ScopeStack,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let engine = build_engine(&cli)?;
    let files = discover::expand_paths(&cli.paths, &cli.extensions);
    if files.is_empty() {
        log::warn!("No files matched {:?}", cli.extensions);
    }

    let options = BatchOptions {
        dry_run: cli.check,
        parallel: !cli.sequential,
    };
    let report = BatchRunner::new(&engine, options).run(&files);

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print!("{}", render::render_summary(&report));
    }

    let pending = cli.check && report.has_changes();
    if report.is_success() && !pending {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn build_engine(cli: &Cli) -> Result<RewriteEngine> {
    let mut profile = match &cli.profile {
        Some(path) => load_profile(path)?,
        None => Profile::builtin(DEFAULT_PROFILE).context("Failed to load builtin profile")?,
    };

    if let Some(flag) = cli.classifier {
        profile.engine.classifier = flag.as_domain();
    }
    if let Some(lookback) = cli.lookback {
        profile.engine.lookback_window = lookback;
    }

    log::debug!(
        "Using profile `{}` with {:?} classifier",
        profile.name,
        profile.engine.classifier
    );
    RewriteEngine::new(profile).context("Invalid engine settings")
}

/// A file on disk wins over a builtin of the same name
fn load_profile(path: &Path) -> Result<Profile> {
    let builtin = path
        .to_str()
        .filter(|name| Profile::builtin_names().contains(name));
    if let (Some(name), false) = (builtin, path.exists()) {
        return Profile::builtin(name)
            .with_context(|| format!("Failed to load builtin profile `{name}`"));
    }

    Profile::load(path).with_context(|| {
        format!(
            "Failed to load profile {} (builtin profiles: {})",
            path.display(),
            Profile::builtin_names().join(", ")
        )
    })
}
