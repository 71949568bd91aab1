use anyhow::{Context, Result};
use clap::Parser;
use lca_core::settings::Settings;
use lca_data::pipeline::run_build;
use lca_index::bootstrap;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("lca-index v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings.index_config();
    tracing::debug!("Build config: {:?}", config);

    let report = run_build(&settings.input_csv, &settings.output_json, &config).with_context(|| {
        format!(
            "failed to build index from {}",
            settings.input_csv.display()
        )
    })?;

    println!(
        "Wrote {} employers to {}",
        report.employers,
        report.output.display()
    );

    Ok(())
}
