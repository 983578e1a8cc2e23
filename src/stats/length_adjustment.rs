//! Length adjustment for Karlin-Altschul statistics.
//!
//! Finds the fixed point of
//!   ell = alpha / lambda * (ln K + ln((m - ell) * (n - N * ell))) + beta
//! where m is the query length, n the database length and N the number of
//! database sequences, using bounded iteration with bisection fallback.

use super::tables::KarlinParams;

#[derive(Debug, Clone, Copy)]
pub struct LengthAdjustment {
    pub length_adjustment: i64,
    pub converged: bool,
}

pub fn compute_length_adjustment(
    query_length: i64,
    db_length: i64,
    db_num_seqs: i64,
    params: &KarlinParams,
) -> LengthAdjustment {
    const MAX_ITERATIONS: usize = 20;

    let m = query_length as f64;
    let n = db_length as f64;
    let n_seqs = db_num_seqs.max(1) as f64;
    let log_k = params.k.ln();
    let alpha_d_lambda = params.alpha / params.lambda;
    let beta = params.beta;

    if m <= 0.0 || n <= 0.0 || params.k <= 0.0 || params.lambda <= 0.0 {
        return LengthAdjustment {
            length_adjustment: 0,
            converged: false,
        };
    }

    // Largest ell with K * (m - ell) * (n - N * ell) > max(m, n)
    let a = n_seqs;
    let mb = m * n_seqs + n;
    let c = n * m - m.max(n) / params.k;
    if c < 0.0 {
        return LengthAdjustment {
            length_adjustment: 0,
            converged: true,
        };
    }
    let discriminant = mb * mb - 4.0 * a * c;
    if discriminant < 0.0 {
        return LengthAdjustment {
            length_adjustment: 0,
            converged: false,
        };
    }

    let mut ell_min = 0.0_f64;
    let mut ell_max = 2.0 * c / (mb + discriminant.sqrt());
    let mut ell_next = 0.0_f64;
    let mut converged = false;

    for i in 1..=MAX_ITERATIONS {
        let ell = ell_next;
        let ss = (m - ell) * (n - n_seqs * ell);
        let ell_bar = alpha_d_lambda * (log_k + ss.ln()) + beta;
        if ell_bar >= ell {
            ell_min = ell;
            if ell_bar - ell_min <= 1.0 {
                converged = true;
                break;
            }
            if ell_min == ell_max {
                break;
            }
        } else {
            ell_max = ell;
        }
        ell_next = if ell_min <= ell_bar && ell_bar <= ell_max {
            ell_bar
        } else if i == 1 {
            ell_max
        } else {
            (ell_min + ell_max) / 2.0
        };
    }

    let mut length_adjustment = ell_min as i64;
    if converged {
        // Use ceil(ell_min) when it still lies below the fixed point
        let ell_ceil = ell_min.ceil();
        if ell_ceil <= ell_max {
            let ss = (m - ell_ceil) * (n - n_seqs * ell_ceil);
            if alpha_d_lambda * (log_k + ss.ln()) + beta >= ell_ceil {
                length_adjustment = ell_ceil as i64;
            }
        }
    }

    LengthAdjustment {
        length_adjustment,
        converged,
    }
}
