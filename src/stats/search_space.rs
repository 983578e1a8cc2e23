use super::length_adjustment::compute_length_adjustment;
use super::tables::KarlinParams;

/// Effective search space after length adjustment.
#[derive(Debug, Clone, Copy)]
pub struct SearchSpace {
    pub effective_query_len: f64,
    pub effective_db_len: f64,
    pub effective_space: f64,
    pub length_adjustment: i64,
}

impl SearchSpace {
    /// m * n without length adjustment.
    pub fn simple(query_len: usize, db_len: usize) -> Self {
        let q = query_len as f64;
        let d = db_len as f64;
        Self {
            effective_query_len: q,
            effective_db_len: d,
            effective_space: q * d,
            length_adjustment: 0,
        }
    }

    /// Search space of one query against a database of `num_sequences`
    /// sequences totalling `total_db_len` residues.
    pub fn for_database_search(
        query_len: usize,
        total_db_len: usize,
        num_sequences: usize,
        params: &KarlinParams,
    ) -> Self {
        let adj = compute_length_adjustment(
            query_len as i64,
            total_db_len as i64,
            num_sequences as i64,
            params,
        );
        let ell = adj.length_adjustment as f64;
        let effective_m = (query_len as f64 - ell).max(1.0);
        let effective_n = (total_db_len as f64 - ell * num_sequences.max(1) as f64).max(1.0);
        Self {
            effective_query_len: effective_m,
            effective_db_len: effective_n,
            effective_space: effective_m * effective_n,
            length_adjustment: adj.length_adjustment,
        }
    }
}
