pub mod error;
pub mod io;
pub mod params;
pub mod report;
pub mod split;
pub mod stats;
pub mod target;
pub mod workflow;

use log::info;

use crate::error::Error;
use crate::params::{Parameters, RunMode};
use crate::target::TargetCatalog;
use crate::workflow::ReadSource;

/// Top-level dispatcher. Called from `main()` after CLI parsing.
pub fn run(params: &Parameters) -> anyhow::Result<()> {
    params.validate()?;

    info!("tesplit v{}", env!("CARGO_PKG_VERSION"));
    info!("run mode: {}", params.run_mode);
    info!("cigar mode: {}", params.cigar_mode);

    let catalog = || load_catalog(params);

    match params.run_mode {
        RunMode::CallTable => workflow::call_table(params, &catalog()?)?,
        RunMode::CallDiagrams => workflow::call_diagrams(params, &catalog()?)?,
        RunMode::SelectGenomeReads => {
            workflow::select_reads(params, &catalog()?, ReadSource::Genome)?
        }
        RunMode::SelectTeReads => {
            workflow::select_reads(params, &catalog()?, ReadSource::Transposon)?
        }
        RunMode::ReadTable => workflow::read_table(params, &catalog()?)?,
        RunMode::ReadDiagram => workflow::read_diagram(params, &catalog()?)?,
        RunMode::SequenceTable => workflow::sequence_table(params, &catalog()?)?,
        RunMode::Coverage => workflow::coverage(params)?,
    }

    info!("{} complete", params.run_mode);
    Ok(())
}

fn load_catalog(params: &Parameters) -> anyhow::Result<TargetCatalog> {
    let path = params
        .targets
        .as_deref()
        .ok_or_else(|| Error::Parameter("--targets is required".into()))?;
    let catalog = TargetCatalog::from_path(path)?;
    info!("targets: {} ({} sites)", path.display(), catalog.len());

    match &params.target_name {
        Some(name) => {
            info!("restricting to target {name}");
            Ok(catalog.restrict_to(name)?)
        }
        None => Ok(catalog),
    }
}
