pub mod demand;
pub mod optimizer;

pub use demand::{PRICE_CEILING, PRICE_GRID_POINTS, PRICE_STEP, demand, price_grid};
pub use optimizer::{coerce_unit_cost, optimize, optimize_with_grid};
