// Command-line surface.

use clap::{Parser, Subcommand, ValueEnum};
use gaffer_core::entity::{Position, StatType};

#[derive(Debug, Parser)]
#[command(name = "gaffer")]
#[command(about = "Fantasy football squad optimizer", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Best 15-player squad over the configured fixture horizon
    Squad,
    /// Best 15-player squad for the next game-week only
    FreeHit,
    /// Transfer suggestions for a manager's current squad
    Transfers {
        /// Manager (entry) id
        #[arg(long)]
        manager: u64,
        /// Free transfers available
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        free_transfers: i64,
    },
    /// Best starting XI from a manager's current squad
    StartingXi {
        /// Manager (entry) id
        #[arg(long)]
        manager: u64,
    },
    /// Top players for one position
    Position {
        /// GK, DEF, MID or FWD
        #[arg(value_parser = parse_position)]
        position: Position,
        /// Number of players; zero or less lists nobody
        #[arg(short, long, default_value_t = 5, allow_negative_numbers = true)]
        n: i64,
    },
    /// Low-ownership picks
    Differentials {
        /// Restrict to one position
        #[arg(long, value_parser = parse_position)]
        position: Option<Position>,
        /// Number of players; zero or less lists nobody
        #[arg(short, long, default_value_t = 5, allow_negative_numbers = true)]
        n: i64,
        /// Ownership ceiling in percent (defaults to config)
        #[arg(long)]
        max_ownership: Option<f64>,
    },
    /// Best points per cost
    BestValue {
        /// Number of players; zero or less lists nobody
        #[arg(short, long, default_value_t = 10, allow_negative_numbers = true)]
        n: i64,
        /// Restrict to one position
        #[arg(long, value_parser = parse_position)]
        position: Option<Position>,
    },
    /// Season leaders (or laggards) for one match stat
    TopStat {
        /// Stat name, e.g. goals_scored, assists, yellow_cards, bonus
        #[arg(value_parser = parse_stat)]
        stat: StatType,
        /// Lowest instead of highest
        #[arg(long)]
        bottom: bool,
        /// Restrict to one position
        #[arg(long, value_parser = parse_position)]
        position: Option<Position>,
    },
    /// Most (or least) improved managers in a classic league
    Improved {
        /// Classic league id
        #[arg(long)]
        league: u64,
        /// Number of managers; zero or less lists nobody
        #[arg(short, long, default_value_t = 5, allow_negative_numbers = true)]
        count: i64,
        /// Least improved instead of most
        #[arg(long)]
        least: bool,
    },
}

/// Clamp a requested result count to zero or more.
pub fn result_count(n: i64) -> usize {
    usize::try_from(n.max(0)).unwrap_or(usize::MAX)
}

fn parse_position(s: &str) -> Result<Position, String> {
    Position::from_str_pos(s).ok_or_else(|| format!("unknown position '{s}' (GK, DEF, MID, FWD)"))
}

fn parse_stat(s: &str) -> Result<StatType, String> {
    StatType::parse(s).ok_or_else(|| {
        let codes: Vec<&str> = StatType::ALL.iter().map(|t| t.code()).collect();
        format!("unknown stat '{s}' (one of: {})", codes.join(", "))
    })
}
