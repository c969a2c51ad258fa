pub mod dispatch;
pub mod longest_run;
pub mod matrix_rank;
pub mod random_excursions;

pub use dispatch::{class_probabilities, derive_masses, DispatchError, WorkItem};
pub use longest_run::{standard_configurations, LongestRunError, TestConfiguration};
