//! Strip `@rules_proto` load declarations from every BUILD file in a tree.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "fix-proto-imports",
    version,
    about = "Remove @rules_proto load statements from BUILD files for Bazel 8"
)]
struct Cli {
    /// Directory to scan (default: current directory).
    #[arg(default_value = ".")]
    root: PathBuf,
}

fn main() {
    protofix::logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let changed = protofix::fix_tree(&cli.root)
        .with_context(|| format!("fix proto imports under {}", cli.root.display()))?;
    for path in changed {
        println!("Fixed: {}", path.display());
    }
    Ok(())
}
