use miette::IntoDiagnostic;
use serde::Serialize;

use stscal_prob::random_excursions::{table_state, visit_table, STATE_RANGE};

#[derive(Serialize)]
struct VisitTable {
    states: Vec<i64>,
    /// Rows are visit-count classes k = 0..CLASS_COUNT.
    classes: Vec<Vec<f64>>,
}

pub(crate) fn run(json: bool) -> miette::Result<()> {
    let table = visit_table();
    let states: Vec<i64> = (0..2 * STATE_RANGE as usize).map(table_state).collect();

    if json {
        let document = VisitTable {
            states,
            classes: table.iter().map(|row| row.to_vec()).collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&document).into_diagnostic()?
        );
        return Ok(());
    }

    for (k, row) in table.iter().enumerate() {
        for (state, probability) in states.iter().zip(row) {
            println!("pi_{k}[{state}] = {probability}");
        }
    }
    Ok(())
}
