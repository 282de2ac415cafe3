// ========================================================================================
//
//                      The knapsack: exact 0/1 selection by dynamic programming
//
// ========================================================================================
//
// Items carry a real-valued cost in weeks that is floored to an integer weight, and a
// value to maximize. The table is a dense `(n + 1) x (W + 1)` buffer; row `i` holds the
// best value reachable with the first `i` items at every capacity. Time and memory are
// both O(n * W), so `W` must stay a small, human-entered week count. The caller is
// responsible for capping it (see `select.rs`).

use ndarray::Array2;

/// One selectable item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnapsackItem {
    pub weeks: f64,
    pub value: f64,
}

/// Indices of the chosen items, in ascending order, and their summed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KnapsackSolution {
    pub chosen: Vec<usize>,
    pub total_value: f64,
}

/// Floors a week count to an integer weight. Negative and NaN costs weigh nothing;
/// fractional weeks are truncated down, never rounded up.
#[inline]
pub fn quantize_weeks(weeks: f64) -> usize {
    // `as` saturates: NaN maps to 0 and huge values to usize::MAX.
    weeks.max(0.0).floor() as usize
}

/// Solves the 0/1 knapsack for `items` under an integer `capacity`.
pub fn solve(items: &[KnapsackItem], capacity: usize) -> KnapsackSolution {
    let n = items.len();
    let weights: Vec<usize> = items.iter().map(|item| quantize_weeks(item.weeks)).collect();

    let mut table = Array2::<f64>::zeros((n + 1, capacity + 1));
    for i in 1..=n {
        let weight = weights[i - 1];
        let value = items[i - 1].value;
        for w in 0..=capacity {
            let skip = table[[i - 1, w]];
            table[[i, w]] = if weight <= w {
                skip.max(table[[i - 1, w - weight]] + value)
            } else {
                skip
            };
        }
    }

    // Walk back from (n, W): a cell that differs from the row above means item i-1 was taken.
    let mut chosen = Vec::new();
    let mut w = capacity;
    for i in (1..=n).rev() {
        if table[[i, w]] != table[[i - 1, w]] {
            chosen.push(i - 1);
            w -= weights[i - 1];
        }
    }
    chosen.reverse();

    log::debug!(
        "Knapsack over {n} items at capacity {capacity} chose {} items",
        chosen.len()
    );

    KnapsackSolution {
        chosen,
        total_value: table[[n, capacity]],
    }
}
