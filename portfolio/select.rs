use super::knapsack::{self, KnapsackItem, quantize_weeks};
use crate::types::ScoredIdea;
use thiserror::Error;

/// Largest week budget accepted by default.
pub const DEFAULT_CAPACITY_CEILING: usize = 4096;

/// Largest DP table accepted by default, in cells. The table holds
/// `(ideas + 1) * (budget + 1)` floats, so this bounds memory at 512 MiB
/// however many ideas a batch carries.
pub const DEFAULT_CELL_CEILING: usize = 64 * 1024 * 1024;

/// Budget errors. Only the selection call fails; scored ideas stay valid.
#[derive(Error, Debug, PartialEq)]
pub enum CapacityError {
    #[error("A budget of {requested} weeks exceeds the supported ceiling of {ceiling} weeks.")]
    BudgetTooLarge { requested: f64, ceiling: usize },
    #[error("The week budget must be a finite number, got {0}.")]
    NonFinite(f64),
    #[error(
        "Selecting among {ideas} ideas with a {budget} week budget needs {cells} table cells, above the supported ceiling of {ceiling}."
    )]
    TableTooLarge {
        ideas: usize,
        budget: usize,
        cells: usize,
        ceiling: usize,
    },
}

/// The chosen subset of a scored batch, with aggregate totals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioSelection {
    /// Indices into the scored ideas, in input order.
    pub indices: Vec<usize>,
    /// Integer week budget the selection was solved for.
    pub budget_weeks: usize,
    /// Sum of the raw (unfloored) development weeks of the chosen ideas.
    pub total_weeks: f64,
    /// Sum of the floored weights that were charged against the budget.
    pub total_quantized_weeks: usize,
    pub total_revenue: f64,
    pub total_profit: f64,
}

impl PortfolioSelection {
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The chosen ideas, in input order.
    pub fn chosen<'a>(&'a self, ideas: &'a [ScoredIdea]) -> impl Iterator<Item = &'a ScoredIdea> {
        self.indices.iter().filter_map(move |&i| ideas.get(i))
    }
}

/// Selects the revenue-maximizing subset of scored ideas under a week budget.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioSelector {
    capacity_ceiling: usize,
    cell_ceiling: usize,
}

impl Default for PortfolioSelector {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_CEILING)
    }
}

impl PortfolioSelector {
    pub fn new(capacity_ceiling: usize) -> Self {
        Self {
            capacity_ceiling,
            cell_ceiling: DEFAULT_CELL_CEILING,
        }
    }

    pub fn with_cell_ceiling(mut self, cell_ceiling: usize) -> Self {
        self.cell_ceiling = cell_ceiling;
        self
    }

    pub fn capacity_ceiling(&self) -> usize {
        self.capacity_ceiling
    }

    pub fn cell_ceiling(&self) -> usize {
        self.cell_ceiling
    }

    /// Checks that the DP table for `ideas` items and `budget` weeks fits the cell ceiling.
    pub fn check_table_size(&self, ideas: usize, budget: usize) -> Result<(), CapacityError> {
        let cells = ideas
            .saturating_add(1)
            .saturating_mul(budget.saturating_add(1));
        if cells > self.cell_ceiling {
            return Err(CapacityError::TableTooLarge {
                ideas,
                budget,
                cells,
                ceiling: self.cell_ceiling,
            });
        }
        Ok(())
    }

    /// Floors the budget and checks it against the ceiling.
    pub fn quantize_budget(&self, budget_weeks: f64) -> Result<usize, CapacityError> {
        if budget_weeks.is_nan() {
            return Err(CapacityError::NonFinite(budget_weeks));
        }
        if budget_weeks.is_infinite() && budget_weeks > 0.0 {
            return Err(CapacityError::BudgetTooLarge {
                requested: budget_weeks,
                ceiling: self.capacity_ceiling,
            });
        }
        let capacity = quantize_weeks(budget_weeks);
        if capacity > self.capacity_ceiling {
            return Err(CapacityError::BudgetTooLarge {
                requested: budget_weeks,
                ceiling: self.capacity_ceiling,
            });
        }
        Ok(capacity)
    }

    /// Runs the selection over scored ideas, valuing each by its expected revenue.
    pub fn select(
        &self,
        ideas: &[ScoredIdea],
        budget_weeks: f64,
    ) -> Result<PortfolioSelection, CapacityError> {
        let capacity = self.quantize_budget(budget_weeks)?;
        self.check_table_size(ideas.len(), capacity)?;
        let items: Vec<KnapsackItem> = ideas
            .iter()
            .map(|idea| KnapsackItem {
                weeks: idea.dev_weeks,
                value: idea.expected_revenue,
            })
            .collect();
        let solution = knapsack::solve(&items, capacity);

        let mut selection = PortfolioSelection {
            budget_weeks: capacity,
            ..PortfolioSelection::default()
        };
        for &i in &solution.chosen {
            let idea = &ideas[i];
            selection.total_weeks += idea.dev_weeks;
            selection.total_quantized_weeks += quantize_weeks(idea.dev_weeks);
            selection.total_revenue += idea.expected_revenue;
            selection.total_profit += idea.expected_profit;
        }
        selection.indices = solution.chosen;

        log::debug!(
            "Selected {} of {} ideas using {} of {} weeks",
            selection.count(),
            ideas.len(),
            selection.total_quantized_weeks,
            capacity
        );
        Ok(selection)
    }
}

/// Selection with the default capacity ceiling.
pub fn select_portfolio(
    ideas: &[ScoredIdea],
    budget_weeks: f64,
) -> Result<PortfolioSelection, CapacityError> {
    PortfolioSelector::default().select(ideas, budget_weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn scored(dev_weeks: f64, expected_revenue: f64) -> ScoredIdea {
        ScoredIdea {
            prob_success: 0.5,
            projected_users: 1000.0,
            dev_weeks,
            best_price: 10.0,
            expected_revenue,
            expected_profit: expected_revenue * 0.9,
        }
    }

    #[test]
    fn selection_respects_budget_and_reports_totals() {
        let ideas = vec![scored(10.0, 100.0), scored(12.0, 90.0), scored(8.0, 150.0)];
        let selection = select_portfolio(&ideas, 18.0).unwrap();
        assert_eq!(selection.indices, vec![0, 2]);
        assert_eq!(selection.count(), 2);
        assert_eq!(selection.budget_weeks, 18);
        assert_abs_diff_eq!(selection.total_weeks, 18.0, epsilon = 1e-12);
        assert_abs_diff_eq!(selection.total_revenue, 250.0, epsilon = 1e-12);
        assert_abs_diff_eq!(selection.total_profit, 225.0, epsilon = 1e-9);
        let chosen: Vec<f64> = selection.chosen(&ideas).map(|i| i.dev_weeks).collect();
        assert_eq!(chosen, vec![10.0, 8.0]);
    }

    #[test]
    fn zero_budget_gives_empty_selection() {
        let ideas = vec![scored(1.0, 5.0)];
        let selection = select_portfolio(&ideas, 0.0).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.total_revenue, 0.0);
    }

    #[test]
    fn negative_and_fractional_budgets_are_floored() {
        let selector = PortfolioSelector::default();
        assert_eq!(selector.quantize_budget(-4.0), Ok(0));
        assert_eq!(selector.quantize_budget(17.9), Ok(17));
    }

    #[test]
    fn budget_above_ceiling_is_rejected() {
        let selector = PortfolioSelector::new(100);
        assert_eq!(
            selector.quantize_budget(101.5),
            Err(CapacityError::BudgetTooLarge {
                requested: 101.5,
                ceiling: 100
            })
        );
        assert_eq!(selector.quantize_budget(100.9), Ok(100));
        assert!(matches!(
            selector.quantize_budget(f64::INFINITY),
            Err(CapacityError::BudgetTooLarge { .. })
        ));
        assert!(matches!(
            selector.quantize_budget(f64::NAN),
            Err(CapacityError::NonFinite(_))
        ));
    }

    #[test]
    fn table_above_cell_ceiling_is_rejected() {
        let ideas: Vec<ScoredIdea> = (0..9).map(|_| scored(1.0, 1.0)).collect();
        let selector = PortfolioSelector::default().with_cell_ceiling(100);
        // (9 + 1) * (10 + 1) = 110 cells
        assert_eq!(
            selector.select(&ideas, 10.0),
            Err(CapacityError::TableTooLarge {
                ideas: 9,
                budget: 10,
                cells: 110,
                ceiling: 100
            })
        );
        // (9 + 1) * (9 + 1) = 100 cells
        assert_eq!(selector.select(&ideas, 9.0).map(|s| s.count()), Ok(9));
    }

    #[test]
    fn quantized_total_can_differ_from_raw_total() {
        let ideas = vec![scored(4.7, 10.0), scored(5.5, 20.0)];
        let selection = select_portfolio(&ideas, 9.0).unwrap();
        assert_eq!(selection.indices, vec![0, 1]);
        assert_eq!(selection.total_quantized_weeks, 9);
        assert_abs_diff_eq!(selection.total_weeks, 10.2, epsilon = 1e-12);
    }
}
