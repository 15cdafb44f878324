use clap::Parser;
use sheetkeeper::{Dice, FsStore, LinePrompt, Session, SessionConfig};
use std::{
    io::{self, Write},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetkeeper")]
#[command(about = "Interactive character sheet, dice roller and check resolver")]
struct Cli {
    /// Directory holding one <name>.json file per character
    #[arg(long)]
    characters_dir: Option<PathBuf>,
    /// RNG seed for determinism
    #[arg(long)]
    seed: Option<u64>,
    /// Optional YAML settings file (characters_dir, seed)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut cfg = match cli.config.as_deref() {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    if let Some(dir) = cli.characters_dir {
        cfg.characters_dir = dir;
    }
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }
    tracing::debug!(
        characters_dir = %cfg.characters_dir.display(),
        seed = ?cfg.seed,
        "starting session"
    );

    let dice = match cfg.seed {
        Some(seed) => Dice::from_seed(seed),
        None => Dice::from_entropy(),
    };
    let mut session = Session::new(FsStore::new(cfg.characters_dir), dice);

    let stdin = io::stdin();
    let mut prompt = LinePrompt::new(stdin.lock(), io::stdout());
    writeln!(prompt.output(), "\ninput command and args delimited by space\n")?;

    while let Some(line) = prompt.next_line()? {
        let outcome = session.execute(&line, &mut prompt);
        if outcome.is_exit() {
            break;
        }
        let text = outcome.to_string();
        if !text.is_empty() {
            writeln!(prompt.output(), "\n{}\n", text)?;
        }
        prompt.output().flush()?;
    }
    Ok(())
}
