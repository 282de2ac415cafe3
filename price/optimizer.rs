//! Revenue-maximizing price search over the discretized grid.
//!
//! The search maximizes revenue only. Profit is reported at the
//! revenue-optimal price as a side metric and is never optimized on its own.

use super::demand::{demand, price_grid};
use crate::types::PricePoint;

/// Unit cost used for profit. Negative and non-finite inputs become 0.0.
#[inline]
pub fn coerce_unit_cost(unit_cost: f64) -> f64 {
    if unit_cost.is_finite() && unit_cost > 0.0 {
        unit_cost
    } else {
        0.0
    }
}

/// Scans the standard price grid and returns the revenue-maximizing point.
pub fn optimize(prob: f64, users: f64, unit_cost: f64) -> PricePoint {
    optimize_with_grid(prob, users, unit_cost, price_grid())
}

/// Scans `prices` in order, keeping the first strict revenue improvement.
///
/// Starts from `{price: 0, revenue: 0, profit: 0}`, which is returned
/// unchanged when no price yields positive revenue.
pub fn optimize_with_grid<I>(prob: f64, users: f64, unit_cost: f64, prices: I) -> PricePoint
where
    I: IntoIterator<Item = f64>,
{
    let unit_cost = coerce_unit_cost(unit_cost);
    let mut best = PricePoint::default();
    for price in prices {
        let units = demand(price, prob, users);
        let revenue = price * units;
        if revenue > best.revenue {
            best = PricePoint {
                price,
                revenue,
                profit: (price - unit_cost).max(0.0) * units,
            };
        }
    }
    best
}
