use miette::IntoDiagnostic;
use serde::Serialize;

use stscal_prob::matrix_rank::rank_distribution;

#[derive(Serialize)]
struct RankProbability {
    rank: u32,
    probability: f64,
}

pub(crate) fn run(rows: u32, cols: u32, json: bool) -> miette::Result<()> {
    if rows.min(cols) < 3 {
        return Err(miette::miette!(
            "Matrix shape {rows}x{cols} is too small: the test needs ranks down to min(M, Q) - 2"
        ));
    }
    let distribution: Vec<RankProbability> = rank_distribution(rows, cols)
        .into_iter()
        .map(|(rank, probability)| RankProbability { rank, probability })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&distribution).into_diagnostic()?
        );
        return Ok(());
    }
    for entry in &distribution {
        println!("p_{} = {}", entry.rank, entry.probability);
    }
    Ok(())
}
