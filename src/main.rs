use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use patience::{
    Board, EmptyTableauRule, Game, RandomShuffler, RecycleStrategy, RuleConfig,
    config::{DEFAULT_MAX_TABLEAU_LEN, DEFAULT_SAME_COLOUR_MOVES},
    describe_action, format_actions, parse_actions,
};

use std::{
    io::{IsTerminal, Read, stdin},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    rules: RuleArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RuleArgs {
    /// Longest a tableau pile may grow
    #[arg(long, global = true, env = "PATIENCE_MAX_STACK", default_value_t = DEFAULT_MAX_TABLEAU_LEN, value_name = "NUM")]
    max_stack: usize,
    /// Same-colour placements allowed per game
    #[arg(long, global = true, env = "PATIENCE_SAME_COLOUR_MOVES", default_value_t = DEFAULT_SAME_COLOUR_MOVES, value_name = "NUM")]
    same_colour_moves: u8,
    /// Let an empty tableau take any card except an ace
    #[arg(long, global = true, env = "PATIENCE_EASY_EMPTY")]
    easy_empty: bool,
    /// How the waste returns to the stock: shuffle or restart
    #[arg(long, global = true, env = "PATIENCE_RECYCLE", default_value_t = RecycleStrategy::Shuffle, value_name = "STRATEGY")]
    recycle: RecycleStrategy,
}

impl RuleArgs {
    fn to_config(&self) -> RuleConfig {
        RuleConfig {
            max_tableau_len: self.max_stack,
            same_colour_moves: self.same_colour_moves,
            empty_tableau: if self.easy_empty {
                EmptyTableauRule::AnyExceptAce
            } else {
                EmptyTableauRule::KingOnly
            },
            recycle: self.recycle,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Deal a new game and print it
    Deal {
        /// Seed for a reproducible deal
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Play actions (e.g. `3D W:T2 T1:T4@2 T1^`) on a new or loaded game
    Play {
        /// Seed for a reproducible deal
        #[arg(short, long)]
        seed: Option<u64>,
        /// Path to a game state file to start from
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Actions to play; read from stdin when omitted
        actions: Vec<String>,
    },
    /// Validate a game state file
    Check {
        /// Path to a game state file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let Cli { rules, command } = Cli::parse();
    let config = rules.to_config();

    match command {
        Commands::Deal { seed } => {
            let game = Game::new(config, shuffler(seed))?;
            println!("{}", game.board().pretty_print());
        }
        Commands::Play {
            seed,
            file,
            actions,
        } => {
            let mut game = match file {
                Some(file) => Game::from_board(load_board(&file)?, config, shuffler(seed))?,
                None => Game::new(config, shuffler(seed))?,
            };
            let content = if !actions.is_empty() {
                actions.join(" ")
            } else if !stdin().is_terminal() {
                let mut content = String::new();
                stdin()
                    .read_to_string(&mut content)
                    .context("Failed to read from stdin")?;
                content
            } else {
                bail!("No actions provided.");
            };
            play(&mut game, &content)?;
        }
        Commands::Check { file } => {
            let board = load_board(&file)?;
            let game = Game::from_board(board, config, RandomShuffler::new())?;
            println!("✓ Valid board, score {}", game.score());
            if game.is_won() {
                println!("The game is won.");
            } else if game.is_forced_win() {
                println!("The game is a forced win.");
            }
        }
    }

    Ok(())
}

fn shuffler(seed: Option<u64>) -> RandomShuffler {
    seed.map(RandomShuffler::seeded).unwrap_or_default()
}

fn load_board(file: &Path) -> Result<Board> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;
    Board::parse(&content).context("Failed to parse board")
}

fn play(game: &mut Game, content: &str) -> Result<()> {
    let actions = parse_actions(content)?;
    let mut applied = Vec::with_capacity(actions.len());
    for action in &actions {
        let description = describe_action(game.board(), action);
        match game.apply(action) {
            Ok(outcome) => {
                applied.push(*action);
                println!("{description}: {}", outcome.describe());
            }
            Err(rejection) => println!("{description}: rejected, {rejection}"),
        }
    }
    let rejected = actions.len() - applied.len();
    println!(
        "\n{}\n\nScore: {}, same-colour moves left: {}",
        game.board().pretty_print(),
        game.score(),
        game.same_colour_moves_remaining()
    );
    if game.is_won() {
        println!("✓ Won");
    } else if game.is_forced_win() {
        println!("Forced win, play `C` to finish.");
    }
    if rejected > 0 {
        println!("{rejected} of {} actions rejected", actions.len());
    }
    if !applied.is_empty() {
        print!("\n===== APPLIED =====\n{}", format_actions(&applied));
    }
    Ok(())
}
