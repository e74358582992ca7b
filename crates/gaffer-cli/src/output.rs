// Rendering result rows as an aligned table, CSV or JSON.

use std::io::Write;

use gaffer_core::entity::Player;
use gaffer_core::LeagueSnapshot;
use gaffer_optimizer::query::ManagerDelta;
use serde::Serialize;

use crate::args::OutputFormat;

/// A row that can be shown as a text table as well as serialized.
pub trait Tabular: Serialize {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

pub fn render<T: Tabular, W: Write>(
    rows: &[T],
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => write_table(rows, out)?,
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_table<T: Tabular, W: Write>(rows: &[T], out: &mut W) -> std::io::Result<()> {
    let headers = T::headers();
    let cells: Vec<Vec<String>> = rows.iter().map(|r| r.cells()).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<width$}", width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.to_vec()))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", line(rule.iter().map(String::as_str).collect()))?;
    for row in &cells {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    if rows.is_empty() {
        writeln!(out, "(no results)")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PlayerRow {
    pub id: u32,
    pub name: String,
    pub team: String,
    pub position: String,
    pub cost: f64,
    pub points: u32,
    pub form: f64,
    pub ownership: f64,
}

impl PlayerRow {
    pub fn new(player: &Player, snapshot: &LeagueSnapshot) -> Self {
        Self {
            id: player.id,
            name: player.web_name.clone(),
            team: team_label(player, snapshot),
            position: player.position.to_string(),
            cost: player.cost_in_units(),
            points: player.total_points,
            form: player.form,
            ownership: player.ownership_percent,
        }
    }

    pub fn list(players: &[Player], snapshot: &LeagueSnapshot) -> Vec<Self> {
        players.iter().map(|p| Self::new(p, snapshot)).collect()
    }
}

impl Tabular for PlayerRow {
    fn headers() -> &'static [&'static str] {
        &["ID", "PLAYER", "TEAM", "POS", "COST", "PTS", "FORM", "OWN%"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.team.clone(),
            self.position.clone(),
            format!("{:.1}", self.cost),
            self.points.to_string(),
            format!("{:.1}", self.form),
            format!("{:.1}", self.ownership),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferRow {
    pub position: String,
    pub out_id: u32,
    pub out_name: String,
    pub in_id: u32,
    pub in_name: String,
    /// Incoming cost minus outgoing cost, in budget units.
    pub cost_change: f64,
}

impl TransferRow {
    pub fn new(out: &Player, incoming: &Player) -> Self {
        Self {
            position: out.position.to_string(),
            out_id: out.id,
            out_name: out.web_name.clone(),
            in_id: incoming.id,
            in_name: incoming.web_name.clone(),
            cost_change: incoming.cost_in_units() - out.cost_in_units(),
        }
    }
}

impl Tabular for TransferRow {
    fn headers() -> &'static [&'static str] {
        &["POS", "OUT", "IN", "COST +/-"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.position.clone(),
            format!("{} ({})", self.out_name, self.out_id),
            format!("{} ({})", self.in_name, self.in_id),
            format!("{:+.1}", self.cost_change),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatRow {
    pub id: u32,
    pub name: String,
    pub team: String,
    pub position: String,
    pub stat: String,
    pub value: i64,
}

impl Tabular for StatRow {
    fn headers() -> &'static [&'static str] {
        &["ID", "PLAYER", "TEAM", "POS", "STAT", "VALUE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.team.clone(),
            self.position.clone(),
            self.stat.clone(),
            self.value.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeltaRow {
    pub manager_id: u64,
    pub manager: String,
    pub team: String,
    pub rank: u32,
    pub delta: i32,
}

impl From<&ManagerDelta> for DeltaRow {
    fn from(d: &ManagerDelta) -> Self {
        Self {
            manager_id: d.standing.manager_id,
            manager: d.standing.manager_name.clone(),
            team: d.standing.team_name.clone(),
            rank: d.standing.rank,
            delta: d.delta,
        }
    }
}

impl Tabular for DeltaRow {
    fn headers() -> &'static [&'static str] {
        &["ID", "MANAGER", "TEAM", "RANK", "DELTA"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.manager_id.to_string(),
            self.manager.clone(),
            self.team.clone(),
            self.rank.to_string(),
            format!("{:+}", self.delta),
        ]
    }
}

pub fn team_label(player: &Player, snapshot: &LeagueSnapshot) -> String {
    snapshot
        .team_of(player)
        .map(|t| t.short_name.clone())
        .unwrap_or_else(|_| format!("#{}", player.team))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<DeltaRow> {
        vec![
            DeltaRow {
                manager_id: 1,
                manager: "Ann Lee".into(),
                team: "Saka Potatoes".into(),
                rank: 1,
                delta: 20,
            },
            DeltaRow {
                manager_id: 22,
                manager: "Bo".into(),
                team: "KD".into(),
                rank: 2,
                delta: -5,
            },
        ]
    }

    fn rendered(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        render(&rows(), format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn table_aligns_columns() {
        let text = rendered(OutputFormat::Table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID  MANAGER  TEAM           RANK  DELTA");
        assert_eq!(lines[1], "--  -------  -------------  ----  -----");
        assert_eq!(lines[2], "1   Ann Lee  Saka Potatoes  1     +20");
        assert_eq!(lines[3], "22  Bo       KD             2     -5");
    }

    #[test]
    fn empty_table_says_so() {
        let mut buf = Vec::new();
        render::<DeltaRow, _>(&[], OutputFormat::Table, &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("(no results)"));
    }

    #[test]
    fn csv_uses_field_names_as_headers() {
        let text = rendered(OutputFormat::Csv);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("manager_id,manager,team,rank,delta"));
        assert_eq!(lines.next(), Some("1,Ann Lee,Saka Potatoes,1,20"));
    }

    #[test]
    fn json_is_an_array_of_objects() {
        let value: serde_json::Value = serde_json::from_str(&rendered(OutputFormat::Json)).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[1]["delta"], -5);
    }
}
