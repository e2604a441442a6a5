use serde::{Deserialize, Serialize};

/// Cosine similarity between two vectors, in [-1.0, 1.0].
///
/// Uses f64 intermediate precision so long vectors accumulate without
/// drifting. A zero-magnitude input (or any non-finite result) yields
/// 0.0 rather than NaN, which the decision rule treats as non-match.
///
/// The two slices must have equal length; callers validate dimensions
/// before reaching this point.
pub fn cosine_sim(a: &[f32], b: &[f32]) -> f32 {
    let mut dot: f64 = 0.0;
    let mut na: f64 = 0.0;
    let mut nb: f64 = 0.0;
    for i in 0..a.len().min(b.len()) {
        let ai = a[i] as f64;
        let bi = b[i] as f64;
        dot += ai * bi;
        na += ai * ai;
        nb += bi * bi;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    let sim = (dot / denom) as f32;
    if sim.is_finite() { sim } else { 0.0 }
}

/// Decision threshold for the match rule.
///
/// The rule is strict: a similarity exactly equal to the threshold is
/// NOT a match. The default of 0.75 matches the reference deployment;
/// it is configuration, not a constant, so it can be tuned per install.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(pub f32);

impl Default for Threshold {
    fn default() -> Self {
        Self(0.75)
    }
}

impl Threshold {
    /// Applies the decision rule: `similarity > threshold`.
    pub fn decide(&self, similarity: f32) -> bool {
        similarity > self.0
    }
}

/// Outcome of a verify call: the raw similarity score plus the
/// thresholded decision. Computed once per call, never cached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Verification {
    pub similarity: f32,
    pub is_match: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical() {
        let a = [0.3, -1.2, 0.5, 2.0];
        let sim = cosine_sim(&a, &a);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_symmetric() {
        let a = [1.0, 2.0, -3.0, 0.25];
        let b = [-0.5, 4.0, 1.5, 2.0];
        assert_eq!(cosine_sim(&a, &b), cosine_sim(&b, &a));
    }

    #[test]
    fn cosine_orthogonal() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!(cosine_sim(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_opposite() {
        let a = [1.0, -2.0, 3.0];
        let b = [-1.0, 2.0, -3.0];
        assert!((cosine_sim(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_scale_invariant() {
        let a = [0.1, 0.7, -0.4];
        let b = [0.5, 3.5, -2.0];
        assert!((cosine_sim(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_zero_vector_is_zero_not_nan() {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 2.0, 3.0];
        assert_eq!(cosine_sim(&a, &b), 0.0);
        assert_eq!(cosine_sim(&a, &a), 0.0);
    }

    #[test]
    fn threshold_boundary_is_strict() {
        let t = Threshold::default();
        assert!(!t.decide(0.75));
        assert!(t.decide(0.75 + f32::EPSILON));
        assert!(!t.decide(0.74));
        assert!(t.decide(0.9));
    }

    #[test]
    fn threshold_configurable() {
        let t = Threshold(0.5);
        assert!(t.decide(0.6));
        assert!(!t.decide(0.5));
    }
}
