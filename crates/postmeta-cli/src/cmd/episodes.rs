//! Episodes subcommand - episode table with post counts

use std::collections::HashMap;

use anyhow::Result;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use postmeta_core::{find_episode, EpisodeTable, MetadataTable};

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let episodes = EpisodeTable::load(&config.paths.episodes)?;
    let metadata = MetadataTable::read_or_empty(&config.paths.csv)?;

    let mut assigned: HashMap<&str, usize> = HashMap::new();
    let mut computed: HashMap<&str, usize> = HashMap::new();
    for record in &metadata.records {
        *assigned.entry(record.cluster.as_str()).or_default() += 1;
        *computed.entry(find_episode(&record.work_date, &episodes)).or_default() += 1;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Slug").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Start").fg(Color::Cyan),
            Cell::new("End").fg(Color::Cyan),
            Cell::new("Posts").fg(Color::Cyan),
            Cell::new("By workDate").fg(Color::Cyan),
        ]);

    for episode in episodes.episodes() {
        let posts = assigned.get(episode.slug.as_str()).copied().unwrap_or(0);
        let by_date = computed.get(episode.slug.as_str()).copied().unwrap_or(0);
        let by_date_cell = if by_date == posts {
            Cell::new(by_date)
        } else {
            Cell::new(by_date).fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(&episode.slug),
            Cell::new(&episode.name),
            Cell::new(episode.start_date),
            Cell::new(episode.end_date),
            Cell::new(posts),
            by_date_cell,
        ]);
    }
    table.add_row(vec![
        Cell::new("(none)").fg(Color::DarkGrey),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(assigned.get("").copied().unwrap_or(0)),
        Cell::new(computed.get("").copied().unwrap_or(0)),
    ]);

    eprintln!("\n{table}");

    for (a, b) in episodes.overlaps() {
        log::warn!("episodes '{a}' and '{b}' overlap; '{a}' wins");
    }
    Ok(())
}
