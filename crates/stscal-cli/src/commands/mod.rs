pub(crate) mod excursions;
pub(crate) mod longest_run;
pub(crate) mod matrix_rank;
