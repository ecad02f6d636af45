//! Command-line driver for the piece generators
//!
//! # Examples
//!
//! ```bash
//! # 14 pieces from the 7-bag
//! cargo run -p wub-cli -- sequence --kind bag --seed 42 --count 14
//!
//! # model-driven sequence on a saved board, waiting for the model first
//! cargo run -p wub-cli -- sequence --kind model --model model.json.gz --wait-model \
//!     --board board.txt --hold T --show-dist
//!
//! # one prediction
//! cargo run -p wub-cli -- predict --model model.json --board board.txt --strategy threshold
//! ```

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use wub_core::generator::PieceGenerator;
use wub_core::infer::predict_distribution;
use wub_core::{
    Board, GeneratorConfig, GeneratorKind, InferenceConfig, InferenceStrategy, LoadedModel,
    ModelSlot, PieceKind, PieceProbability, generator_factory,
};

#[derive(Parser, Debug)]
#[command(name = "wub", author, version, about = "Piece generator and predictor", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Draw pieces, notifying the generator of a lock before each draw
    Sequence {
        #[command(flatten)]
        generator: GeneratorArgs,
        /// Model file (.json or gzip-compressed), loaded in the background
        #[arg(long)]
        model: Option<PathBuf>,
        /// Wait for the model load before drawing
        #[arg(long)]
        wait_model: bool,
        /// Board file (rows of `.` and piece letters, top row first)
        #[arg(long)]
        board: Option<PathBuf>,
        /// Held piece
        #[arg(long)]
        hold: Option<PieceKind>,
        /// Print the distribution each piece was drawn from
        #[arg(long)]
        show_dist: bool,
    },
    /// Preview upcoming pieces without consuming them
    Peek {
        #[command(flatten)]
        generator: GeneratorArgs,
    },
    /// Run one inference and print the shaped distribution
    Predict {
        /// Model file (.json or gzip-compressed)
        #[arg(long)]
        model: PathBuf,
        /// Board file (empty 20x10 board if omitted)
        #[arg(long)]
        board: Option<PathBuf>,
        /// Held piece
        #[arg(long)]
        hold: Option<PieceKind>,
        /// clean_uniform | threshold
        #[arg(long, value_parser = parse_strategy, default_value = "clean_uniform")]
        strategy: InferenceStrategy,
        #[arg(long, default_value_t = wub_core::config::DEFAULT_TEMPERATURE)]
        temperature: f32,
        #[arg(long, default_value_t = wub_core::config::DEFAULT_THRESHOLD)]
        threshold: f32,
        /// Invert the distribution instead of applying the strategy
        #[arg(long)]
        curse: bool,
    },
}

#[derive(Args, Debug)]
struct GeneratorArgs {
    /// TOML generator configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured kind
    /// (bag | bag_plus_one | doubled_bag | random | table | model | curse)
    #[arg(long, value_parser = parse_kind)]
    kind: Option<GeneratorKind>,
    /// Seed (random if omitted)
    #[arg(long)]
    seed: Option<u32>,
    /// Number of pieces
    #[arg(long, default_value_t = 14)]
    count: usize,
}

impl GeneratorArgs {
    fn resolve_config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => GeneratorConfig::default(),
        };
        if let Some(kind) = self.kind {
            config.kind = kind;
        }
        Ok(config)
    }

    fn resolve_seed(&self) -> u32 {
        let seed = self.seed.unwrap_or_else(rand::random);
        info!("seed {seed}");
        seed
    }
}

fn parse_kind(s: &str) -> Result<GeneratorKind, String> {
    GeneratorKind::from_name(s).ok_or_else(|| format!("unknown generator kind: {s}"))
}

fn parse_strategy(s: &str) -> Result<InferenceStrategy, String> {
    InferenceStrategy::from_name(s).ok_or_else(|| format!("unknown inference strategy: {s}"))
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
    builder
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .target(env_logger::Target::Stderr)
        .init();
}

fn load_board(path: Option<&Path>) -> Result<Board> {
    let Some(path) = path else {
        return Ok(Board::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read board {}", path.display()))?;
    Board::parse(&text).with_context(|| format!("invalid board {}", path.display()))
}

fn format_distribution(dist: &[PieceProbability]) -> String {
    dist.iter()
        .map(|p| format!("{}:{:.3}", p.piece, p.probability))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_pieces(pieces: &[PieceKind]) -> String {
    pieces.iter().map(|p| p.letter()).collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.cmd {
        Cmd::Sequence {
            generator,
            model,
            wait_model,
            board,
            hold,
            show_dist,
        } => {
            let config = generator.resolve_config()?;
            let board = load_board(board.as_deref())?;
            let slot = ModelSlot::empty();

            match model {
                Some(path) => {
                    let load = LoadedModel::load_async(path.clone());
                    if wait_model {
                        slot.resolve(load)
                            .await
                            .with_context(|| format!("failed to load model {}", path.display()))?;
                    } else {
                        // installed whenever it finishes; draws before that are uniform
                        drop(slot.resolve_with(load));
                    }
                }
                None if config.kind.uses_model() => {
                    warn!("no --model given, {} draws uniformly", config.kind.name());
                }
                None => {}
            }

            let ctor = generator_factory(&config, &slot);
            let mut active = ctor(generator.resolve_seed());
            info!("generator {}", active.name());

            let mut failed_locks = 0usize;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for _ in 0..generator.count {
                if active.on_lock(&board, hold).is_err() {
                    failed_locks += 1;
                }
                let piece = active.next_piece();
                match active.last_sample_distribution() {
                    Some(dist) if show_dist => {
                        writeln!(out, "{piece}  {}", format_distribution(&dist))?
                    }
                    _ => writeln!(out, "{piece}")?,
                }
            }
            if failed_locks > 0 {
                warn!("{failed_locks} inference call(s) failed and fell back to uniform");
            }
        }

        Cmd::Peek { generator } => {
            let config = generator.resolve_config()?;
            let ctor = generator_factory(&config, &ModelSlot::empty());
            let mut active = ctor(generator.resolve_seed());
            let preview = active.peek(generator.count);
            if preview.is_empty() && generator.count > 0 {
                bail!("{} generators cannot preview pieces", active.name());
            }
            println!("{}", format_pieces(&preview));
        }

        Cmd::Predict {
            model,
            board,
            hold,
            strategy,
            temperature,
            threshold,
            curse,
        } => {
            let loaded = LoadedModel::load(&model)
                .with_context(|| format!("failed to load model {}", model.display()))?;
            let board = load_board(board.as_deref())?;
            let config = InferenceConfig {
                strategy,
                temperature,
                threshold,
            };
            let dist = predict_distribution(&loaded, &board, hold, &config, curse)
                .context("inference failed")?;
            for p in dist {
                println!("{} {:.6}", p.piece, p.probability);
            }
        }
    }

    Ok(())
}
