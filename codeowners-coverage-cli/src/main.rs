use std::{
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{builder::FalseyValueParser, Parser, ValueEnum};
use tracing::{debug, Level as TraceLevel};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use codeowners_coverage::{
    coverage,
    report::{TracingReporter, WorkflowCommands},
    Annotation, Level, Options, Reporter,
};

/// Check that every file in a repository is covered by CODEOWNERS
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Repository root to scan
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    root: PathBuf,

    /// CODEOWNERS file to use instead of searching the usual locations,
    /// relative to the working directory
    #[arg(short = 'f', long = "file")]
    codeowners_file: Option<PathBuf>,

    /// Space separated glob patterns limiting the scan
    #[arg(long, env = "INPUT_FILES", default_value = "")]
    files: String,

    /// Leave files matched by .gitignore out of the coverage computation
    #[arg(long, env = "INPUT_INCLUDE-GITIGNORE", value_parser = FalseyValueParser::new())]
    include_gitignore: bool,

    /// Scan the .git directory too
    #[arg(long, env = "INPUT_INCLUDE-GIT", value_parser = FalseyValueParser::new())]
    include_git: bool,

    /// Don't count the `*` default owner rule towards coverage
    #[arg(long, env = "INPUT_IGNORE-DEFAULT", value_parser = FalseyValueParser::new())]
    ignore_default: bool,

    /// Treat `#?pattern` lines as files that intentionally have no owner
    #[arg(long, env = "INPUT_PARSE-UNOWNED-FILES", value_parser = FalseyValueParser::new())]
    parse_unowned_files: bool,

    /// Token for the CI platform; not needed to compute coverage
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Output format, `github` by default when running in GitHub Actions
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// GitHub Actions workflow commands
    Github,
    /// Log lines on stderr
    Plain,
}

impl Cli {
    fn format(&self) -> Format {
        self.format.unwrap_or_else(|| {
            match std::env::var("GITHUB_ACTIONS").as_deref() {
                Ok("true") => Format::Github,
                _ => Format::Plain,
            }
        })
    }

    fn options(&self) -> Options {
        Options {
            include_gitignore: self.include_gitignore,
            include_git: self.include_git,
            ignore_default: self.ignore_default,
            parse_unowned_files: self.parse_unowned_files,
            manifest_path: self.codeowners_file.clone(),
            ..Default::default()
        }
        .with_files(&self.files)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.format());

    let mut reporter: Box<dyn Reporter> = match cli.format() {
        Format::Github => Box::new(WorkflowCommands::new(io::stdout())),
        Format::Plain => Box::new(TracingReporter),
    };

    match run(&cli, reporter.as_mut()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            reporter.report(Level::Error, &format!("{:#}", err), &Annotation::default());
            reporter.group(&err.to_string(), &format!("{:?}", err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, reporter: &mut dyn Reporter) -> Result<bool> {
    if cli.github_token.as_deref().is_some_and(|token| !token.is_empty()) {
        debug!("github token provided");
    }

    let root = cli.root.as_path();
    check_root(root)?;
    let coverage = coverage::run(root, &cli.options(), reporter)
        .with_context(|| format!("coverage check failed in {}", root.display()))?;
    Ok(coverage.is_complete())
}

fn check_root(root: &Path) -> Result<()> {
    if !root.is_dir() {
        anyhow::bail!("path is not a directory: {}", root.display());
    }
    Ok(())
}

fn init_tracing(verbose: bool, format: Format) {
    // RUST_LOG always applies; --verbose adds DEBUG. Plain output is the
    // report itself, so it needs INFO to be visible.
    let level = match (verbose, format) {
        (true, _) => TraceLevel::DEBUG,
        (false, Format::Plain) => TraceLevel::INFO,
        (false, Format::Github) => TraceLevel::WARN,
    };
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .without_time(),
        )
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .try_init();
}
