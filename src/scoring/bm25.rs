//! BM25 scoring (spec §4.7). Adapted closely from the teacher's
//! `scoring/bm_25.rs`, widened from `f32` to `f64` since scores here feed
//! straight into the log-quantized impact codec and the extra precision
//! costs nothing. `idf` is intentionally left unclamped even when
//! negative (a very common term can make it so) — spec.md is explicit
//! that callers must not clamp it.

#[derive(Debug, Clone, Copy)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
    pub n: u32,
}

impl Bm25Params {
    pub fn new(k1: f64, b: f64, n: u32) -> Self {
        Self { k1, b, n }
    }

    /// `ln((N - n_t + 0.5) / (n_t + 0.5))`, not clamped.
    pub fn idf(&self, n_t: u32) -> f64 {
        ((self.n as f64 - n_t as f64 + 0.5) / (n_t as f64 + 0.5)).ln()
    }

    /// `((k1 + 1) * f_td) / (k1 * ((1 - b) + b * L_d / L_avg) + f_td)`.
    pub fn tf(&self, f_td: u32, doc_len: u32, avg_doc_len: f64) -> f64 {
        let f_td = f_td as f64;
        let numerator = (self.k1 + 1.0) * f_td;
        let denominator =
            self.k1 * ((1.0 - self.b) + self.b * (doc_len as f64 / avg_doc_len)) + f_td;
        numerator / denominator
    }

    /// `idf * tf`, the full per-posting BM25 contribution.
    pub fn score(&self, f_td: u32, doc_len: u32, avg_doc_len: f64, n: u32, n_t: u32) -> f64 {
        debug_assert_eq!(n, self.n);
        self.idf(n_t) * self.tf(f_td, doc_len, avg_doc_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idf_is_positive_for_rare_terms() {
        let params = Bm25Params::new(1.2, 0.75, 1000);
        assert!(params.idf(1) > 0.0);
    }

    #[test]
    fn idf_can_go_negative_for_ubiquitous_terms_and_is_not_clamped() {
        let params = Bm25Params::new(1.2, 0.75, 100);
        assert!(params.idf(99) < 0.0);
    }

    #[test]
    fn tf_increases_with_term_frequency() {
        let params = Bm25Params::new(1.2, 0.75, 1000);
        let low = params.tf(1, 100, 100.0);
        let high = params.tf(10, 100, 100.0);
        assert!(high > low);
    }

    #[test]
    fn tf_decreases_for_longer_than_average_documents() {
        let params = Bm25Params::new(1.2, 0.75, 1000);
        let short = params.tf(5, 50, 100.0);
        let long = params.tf(5, 300, 100.0);
        assert!(short > long);
    }

    #[test]
    fn score_combines_idf_and_tf() {
        let params = Bm25Params::new(1.2, 0.75, 1000);
        let score = params.score(3, 100, 100.0, 1000, 5);
        assert_eq!(score, params.idf(5) * params.tf(3, 100, 100.0));
    }
}
