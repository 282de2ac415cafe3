pub mod knapsack;
pub mod select;

pub use knapsack::{KnapsackItem, KnapsackSolution, quantize_weeks, solve};
pub use select::{
    CapacityError, DEFAULT_CAPACITY_CEILING, DEFAULT_CELL_CEILING, PortfolioSelection,
    PortfolioSelector, select_portfolio,
};
