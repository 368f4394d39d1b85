use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use dashplot::cleanup::{query_delete, TEX_PATTERN_GROUPS};

/// Delete LaTeX build artefacts below a directory, asking once per file group.
#[derive(Parser, Debug)]
#[command(name = "clean-tex", version, about)]
struct Args {
    /// Directory to clean
    #[arg(default_value = ".")]
    root: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let stdin = io::stdin();
    let mut removed = 0;
    for patterns in TEX_PATTERN_GROUPS {
        removed += query_delete(true, &args.root, patterns, stdin.lock(), io::stdout())
            .with_context(|| format!("Failed to clean '{patterns}' under {:?}", args.root))?;
    }
    tracing::info!("Removed {} file(s) in total", removed);
    Ok(())
}
