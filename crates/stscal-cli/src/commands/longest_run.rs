use miette::IntoDiagnostic;
use serde::Serialize;
use tracing::info;

use stscal_prob::longest_run::{standard_configurations, unit_rational_to_f64};
use stscal_prob::{derive_masses, TestConfiguration};

#[derive(Serialize)]
struct DerivedMasses {
    k: u64,
    block_len: u64,
    boundaries: Vec<u64>,
    masses: Vec<f64>,
}

/// Derive the longest-run probability masses for every standard
/// configuration, strictly sequentially: the worst case of one
/// configuration is already the resource ceiling, so configurations are
/// never pipelined with each other.
pub(crate) fn run(workers: usize, json: bool) -> miette::Result<()> {
    let mut derived = Vec::new();
    for config in standard_configurations() {
        info!(
            k = config.k,
            block_len = config.block_len,
            workers,
            "deriving longest-run masses"
        );
        derived.push(derive_config(&config, workers)?);
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&derived).into_diagnostic()?
        );
        return Ok(());
    }

    for entry in &derived {
        println!("K = {}, M = {}", entry.k, entry.block_len);
        for (index, mass) in entry.masses.iter().enumerate() {
            // f64 Display is the shortest representation that round-trips,
            // i.e. full available precision.
            println!("pi_{index} = {mass}");
        }
        println!();
    }
    Ok(())
}

fn derive_config(config: &TestConfiguration, workers: usize) -> miette::Result<DerivedMasses> {
    let masses = derive_masses(config, workers).into_diagnostic()?;
    let masses = masses
        .iter()
        .map(unit_rational_to_f64)
        .collect::<Result<Vec<f64>, _>>()
        .into_diagnostic()?;
    Ok(DerivedMasses {
        k: config.k,
        block_len: config.block_len,
        boundaries: config.boundaries.clone(),
        masses,
    })
}
