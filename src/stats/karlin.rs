use super::search_space::SearchSpace;
use super::tables::KarlinParams;

/// Bit score: S' = (lambda * S - ln K) / ln 2
pub fn bit_score(raw_score: i32, params: &KarlinParams) -> f64 {
    (params.lambda * raw_score as f64 - params.k.ln()) / std::f64::consts::LN_2
}

/// E-value: E = m' * n' * 2^(-S')
pub fn evalue(bit_score: f64, search_space: &SearchSpace) -> f64 {
    search_space.effective_space * 2.0_f64.powf(-bit_score)
}

/// Smallest raw score whose E-value does not exceed `e_value`.
///
/// S = (ln K + ln(m'n') - ln E) / lambda
pub fn raw_score_from_evalue(e_value: f64, params: &KarlinParams, search_space: &SearchSpace) -> i32 {
    if e_value <= 0.0 {
        return i32::MAX;
    }
    let score = (params.k.ln() + search_space.effective_space.ln() - e_value.ln()) / params.lambda;
    score.ceil().clamp(1.0, i32::MAX as f64) as i32
}
