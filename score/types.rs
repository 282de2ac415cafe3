// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only are used in one file.

use serde::Serialize;
use std::fmt;

/// Number of raw features every idea carries.
pub const NUM_FEATURES: usize = 5;

/// Canonical feature columns, in the exact order the model coefficients expect.
pub const FEATURE_COLUMNS: [&str; NUM_FEATURES] = [
    "novelty_score",
    "feasibility_score",
    "projected_users",
    "est_dev_weeks",
    "prior_similar_success_rate",
];

/// A raw feature vector in canonical column order.
pub type FeatureVector = [f64; NUM_FEATURES];

/// Coerces a raw field to a float. Missing, empty, non-numeric and non-finite
/// values all become 0.0; this is a lossy default, never an error.
pub fn coerce_feature(raw: Option<&str>) -> f64 {
    let Some(text) = raw else {
        return 0.0;
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            log::warn!("Coercing non-numeric value '{trimmed}' to 0.0");
            0.0
        }
    }
}

/// Coerces an already-numeric value, mapping NaN and infinities to 0.0.
#[inline]
pub fn coerce_number(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// One candidate idea, as read from an input row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Idea {
    pub novelty_score: f64,
    pub feasibility_score: f64,
    pub projected_users: f64,
    pub est_dev_weeks: f64,
    pub prior_similar_success_rate: f64,
}

impl Idea {
    /// Builds an idea from numeric values, coercing anything non-finite to 0.0.
    pub fn new(
        novelty_score: f64,
        feasibility_score: f64,
        projected_users: f64,
        est_dev_weeks: f64,
        prior_similar_success_rate: f64,
    ) -> Self {
        Self {
            novelty_score: coerce_number(novelty_score),
            feasibility_score: coerce_number(feasibility_score),
            projected_users: coerce_number(projected_users),
            est_dev_weeks: coerce_number(est_dev_weeks),
            prior_similar_success_rate: coerce_number(prior_similar_success_rate),
        }
    }

    /// Builds an idea from a field lookup keyed by canonical column name.
    pub fn from_lookup<'a, F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<&'a str>,
    {
        let mut values = [0.0; NUM_FEATURES];
        for (slot, column) in values.iter_mut().zip(FEATURE_COLUMNS) {
            *slot = coerce_feature(lookup(column));
        }
        Self::from_features(values)
    }

    pub fn from_features(features: FeatureVector) -> Self {
        Self::new(
            features[0],
            features[1],
            features[2],
            features[3],
            features[4],
        )
    }

    /// Extracts the features in canonical order.
    pub fn features(&self) -> FeatureVector {
        [
            self.novelty_score,
            self.feasibility_score,
            self.projected_users,
            self.est_dev_weeks,
            self.prior_similar_success_rate,
        ]
    }
}

/// The revenue-optimal price point for one idea.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PricePoint {
    pub price: f64,
    pub revenue: f64,
    /// Profit at the revenue-maximizing price, not the profit-maximizing one.
    pub profit: f64,
}

/// The fully scored record produced for one idea.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredIdea {
    pub prob_success: f64,
    pub projected_users: f64,
    pub dev_weeks: f64,
    pub best_price: f64,
    pub expected_revenue: f64,
    pub expected_profit: f64,
}

impl ScoredIdea {
    pub fn from_parts(idea: &Idea, prob_success: f64, point: PricePoint) -> Self {
        Self {
            prob_success,
            projected_users: idea.projected_users,
            dev_weeks: idea.est_dev_weeks,
            best_price: point.price,
            expected_revenue: point.revenue,
            expected_profit: point.profit,
        }
    }
}

impl fmt::Display for ScoredIdea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p={:.6} users={} weeks={} price=${:.2} revenue=${:.2} profit=${:.2}",
            self.prob_success,
            self.projected_users.round(),
            self.dev_weeks.round(),
            self.best_price,
            self.expected_revenue,
            self.expected_profit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn coerce_feature_falls_back_to_zero() {
        assert_eq!(coerce_feature(None), 0.0);
        assert_eq!(coerce_feature(Some("")), 0.0);
        assert_eq!(coerce_feature(Some("   ")), 0.0);
        assert_eq!(coerce_feature(Some("abc")), 0.0);
        assert_eq!(coerce_feature(Some("NaN")), 0.0);
        assert_eq!(coerce_feature(Some("inf")), 0.0);
        assert_eq!(coerce_feature(Some(" 12.5 ")), 12.5);
        assert_eq!(coerce_feature(Some("-3")), -3.0);
    }

    #[test]
    fn from_lookup_reads_canonical_columns() {
        let mut row = HashMap::new();
        row.insert("novelty_score", "0.8");
        row.insert("feasibility_score", "oops");
        row.insert("projected_users", "30000");
        row.insert("est_dev_weeks", "10");

        let idea = Idea::from_lookup(|key| row.get(key).copied());
        assert_eq!(idea.features(), [0.8, 0.0, 30000.0, 10.0, 0.0]);
    }

    #[test]
    fn new_sanitizes_non_finite_values() {
        let idea = Idea::new(f64::NAN, 1.0, f64::INFINITY, 2.0, f64::NEG_INFINITY);
        assert_eq!(idea.features(), [0.0, 1.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn scored_idea_carries_users_and_weeks_unchanged() {
        let idea = Idea::new(0.1, 0.2, 1234.5, 7.9, 0.3);
        let point = PricePoint {
            price: 10.0,
            revenue: 50.0,
            profit: 45.0,
        };
        let scored = ScoredIdea::from_parts(&idea, 0.25, point);
        assert_eq!(scored.projected_users, 1234.5);
        assert_eq!(scored.dev_weeks, 7.9);
        assert_eq!(scored.best_price, 10.0);
        assert_eq!(scored.expected_profit, 45.0);
    }
}
