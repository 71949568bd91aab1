use anyhow::{Context, Result};
use clap::Parser;
use lca_core::settings::LookupSettings;
use lca_data::lookup::{find_match, MatchKind};
use lca_data::writer::load_index;
use lca_index::bootstrap;

fn main() -> Result<()> {
    let settings = LookupSettings::parse();

    bootstrap::setup_logging(&settings.log_level)?;

    let index = load_index(&settings.index_json)
        .with_context(|| format!("failed to load index {}", settings.index_json.display()))?;

    let Some(found) = find_match(&index, &settings.company) else {
        println!("No match for \"{}\"", settings.company);
        return Ok(());
    };

    let kind = match found.kind {
        MatchKind::Exact => "exact",
        MatchKind::Prefix => "prefix",
    };
    let year = found
        .record
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "all years".to_string());

    println!("{} ({} match on {})", found.record.company, kind, found.key);
    println!("  filings: {} ({})", found.record.count, year);
    for role in &found.record.roles {
        println!("  - {}", role);
    }

    Ok(())
}
