// Subcommand dispatch: fetch, compute, render.

use std::io::Write;

use anyhow::Context;
use gaffer_core::config::Config;
use gaffer_core::FplContext;
use gaffer_optimizer::query::{self, Extreme, Improvement, PlayerFilter};
use gaffer_optimizer::{RecommendSettings, Recommender};
use tracing::info;

use crate::args::{result_count, Cli, Command};
use crate::output::{render, team_label, DeltaRow, PlayerRow, StatRow, TransferRow};

pub async fn run<W: Write>(cli: &Cli, config: &Config, out: &mut W) -> anyhow::Result<()> {
    let ctx = FplContext::from_config(config).context("failed to build data source")?;
    let recommender = Recommender::new(RecommendSettings::from(&config.squad));
    let format = cli.format;

    let snapshot = ctx
        .snapshot()
        .await
        .context("failed to load season data")?;
    info!(
        players = snapshot.players().count(),
        fixtures = snapshot.fixtures().count(),
        "Season data loaded"
    );

    match &cli.command {
        Command::Squad => {
            let squad = recommender.recommend_full_squad(&snapshot)?;
            render(&PlayerRow::list(&squad, &snapshot), format, out)?;
        }
        Command::FreeHit => {
            let squad = recommender.recommend_free_hit_squad(&snapshot)?;
            render(&PlayerRow::list(&squad, &snapshot), format, out)?;
        }
        Command::Transfers {
            manager,
            free_transfers,
        } => {
            let plan = recommender
                .recommend_transfers_for_manager(&ctx, *manager, *free_transfers)
                .await
                .with_context(|| format!("failed to plan transfers for manager {manager}"))?;
            let rows: Vec<TransferRow> = plan
                .transfers
                .iter()
                .map(|(leaving, incoming)| TransferRow::new(leaving, incoming))
                .collect();
            render(&rows, format, out)?;
        }
        Command::StartingXi { manager } => {
            let xi = recommender
                .recommend_starting_xi_for_manager(&ctx, *manager)
                .await
                .with_context(|| format!("failed to pick a starting XI for manager {manager}"))?;
            render(&PlayerRow::list(&xi, &snapshot), format, out)?;
        }
        Command::Position { position, n } => {
            let players = recommender.recommend_by_position(&snapshot, *position, player_count(*n))?;
            render(&PlayerRow::list(&players, &snapshot), format, out)?;
        }
        Command::Differentials {
            position,
            n,
            max_ownership,
        } => {
            let players = recommender.recommend_differentials(
                &snapshot,
                *position,
                player_count(*n),
                *max_ownership,
            )?;
            render(&PlayerRow::list(&players, &snapshot), format, out)?;
        }
        Command::BestValue { n, position } => {
            let filter = PlayerFilter {
                position: *position,
                ..PlayerFilter::default()
            };
            let players = query::best_value(snapshot.players(), result_count(*n), filter);
            render(&PlayerRow::list(&players, &snapshot), format, out)?;
        }
        Command::TopStat {
            stat,
            bottom,
            position,
        } => {
            let extreme = if *bottom { Extreme::Bottom } else { Extreme::Top };
            let filter = PlayerFilter {
                position: *position,
                ..PlayerFilter::default()
            };
            let rows: Vec<StatRow> = query::top_or_bottom_by_stat(&snapshot, *stat, extreme, filter)
                .into_iter()
                .map(|(player, value)| StatRow {
                    id: player.id,
                    name: player.web_name.clone(),
                    team: team_label(&player, &snapshot),
                    position: player.position.to_string(),
                    stat: stat.code().to_string(),
                    value,
                })
                .collect();
            render(&rows, format, out)?;
        }
        Command::Improved {
            league,
            count,
            least,
        } => {
            let direction = if *least {
                Improvement::Least
            } else {
                Improvement::Most
            };
            let deltas = query::improved_managers(&ctx, *league, result_count(*count), direction)
                .await
                .with_context(|| format!("failed to rank managers in league {league}"))?;
            let rows: Vec<DeltaRow> = deltas.iter().map(DeltaRow::from).collect();
            render(&rows, format, out)?;
        }
    }
    Ok(())
}

fn player_count(n: i64) -> u32 {
    u32::try_from(result_count(n)).unwrap_or(u32::MAX)
}
