//! A deliberately simple willingness-to-pay curve.
//!
//! Demand falls linearly from the full potential at price 0 to nothing at
//! [`PRICE_CEILING`], scaled by success probability and user count.

/// Price at which demand reaches zero.
pub const PRICE_CEILING: f64 = 20.0;
/// Spacing of the discretized price grid.
pub const PRICE_STEP: f64 = 0.5;
/// Number of grid points, `0.5, 1.0, ..., 20.0`.
pub const PRICE_GRID_POINTS: usize = 40;

/// Expected units sold at `price`.
#[inline]
pub fn demand(price: f64, prob: f64, users: f64) -> f64 {
    let base = prob.clamp(0.0, 1.0) * users.max(0.0);
    base * (1.0 - price / PRICE_CEILING).max(0.0)
}

/// The candidate prices in ascending order.
///
/// Each point is `PRICE_STEP * i` for `i = 1..=PRICE_GRID_POINTS`, computed by
/// multiplication rather than accumulation so every value is exact.
pub fn price_grid() -> impl Iterator<Item = f64> {
    (1..=PRICE_GRID_POINTS).map(|i| i as f64 * PRICE_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn grid_spans_half_dollar_to_ceiling() {
        let grid: Vec<f64> = price_grid().collect();
        assert_eq!(grid.len(), 40);
        assert_eq!(grid[0], 0.5);
        assert_eq!(grid[39], 20.0);
        assert!(grid.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn demand_declines_linearly_to_zero() {
        assert_abs_diff_eq!(demand(0.0, 1.0, 1000.0), 1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(demand(10.0, 1.0, 1000.0), 500.0, epsilon = 1e-9);
        assert_eq!(demand(20.0, 1.0, 1000.0), 0.0);
        assert_eq!(demand(25.0, 1.0, 1000.0), 0.0);
    }

    #[test]
    fn demand_clamps_probability_and_users() {
        assert_abs_diff_eq!(demand(10.0, 1.7, 100.0), 50.0, epsilon = 1e-9);
        assert_eq!(demand(10.0, -0.3, 100.0), 0.0);
        assert_eq!(demand(10.0, 0.5, -100.0), 0.0);
    }
}
