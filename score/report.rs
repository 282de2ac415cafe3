//! Presentation helpers around scored ideas: KPI summaries, filters, sorting
//! and the CSV/text writers used by the command-line front end. Nothing here
//! feeds back into scoring or selection.

use crate::data::PricingInput;
use crate::portfolio::PortfolioSelection;
use crate::types::{PricePoint, ScoredIdea};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unknown sort key '{0}'. Expected one of: {keys}.", keys = SortKey::NAMES.join(", "))]
    UnknownSortKey(String),
}

/// Column order of the full pricing report.
pub const PRICING_REPORT_COLUMNS: [&str; 6] = [
    "prob_success",
    "projected_users",
    "dev_weeks",
    "best_price",
    "expected_revenue",
    "expected_profit",
];

/// Aggregate figures over a batch of scored ideas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub count: usize,
    pub prob_min: f64,
    pub prob_avg: f64,
    pub prob_max: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
}

impl Summary {
    /// Summarizes `ideas`; an empty batch reports zeros everywhere.
    pub fn of(ideas: &[ScoredIdea]) -> Self {
        if ideas.is_empty() {
            return Self::default();
        }
        let mut summary = Self {
            count: ideas.len(),
            prob_min: f64::INFINITY,
            prob_max: f64::NEG_INFINITY,
            ..Self::default()
        };
        let mut prob_sum = 0.0;
        for idea in ideas {
            summary.prob_min = summary.prob_min.min(idea.prob_success);
            summary.prob_max = summary.prob_max.max(idea.prob_success);
            prob_sum += idea.prob_success;
            summary.total_revenue += idea.expected_revenue;
            summary.total_profit += idea.expected_profit;
        }
        summary.prob_avg = prob_sum / ideas.len() as f64;
        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ideas: {} | Prob min/avg/max: {:.3}/{:.3}/{:.3} | Total revenue: {} | Total profit: {}",
            self.count,
            self.prob_min,
            self.prob_avg,
            self.prob_max,
            format_money(self.total_revenue),
            format_money(self.total_profit)
        )
    }
}

/// Post-scoring filters. A zero threshold disables that filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Filters {
    pub min_users: f64,
    pub min_prob: f64,
    pub max_weeks_per_idea: f64,
}

impl Filters {
    pub fn accepts(&self, idea: &ScoredIdea) -> bool {
        (self.min_users <= 0.0 || idea.projected_users >= self.min_users)
            && (self.min_prob <= 0.0 || idea.prob_success >= self.min_prob)
            && (self.max_weeks_per_idea <= 0.0 || idea.dev_weeks <= self.max_weeks_per_idea)
    }

    /// Keeps the ideas passing every active filter, in their original order,
    /// remembering which input row each one came from.
    pub fn apply(&self, ideas: &[ScoredIdea]) -> FilteredIdeas {
        let mut kept = FilteredIdeas::default();
        for (row, idea) in ideas.iter().enumerate() {
            if self.accepts(idea) {
                kept.rows.push(row);
                kept.ideas.push(*idea);
            }
        }
        kept
    }
}

/// The ideas that passed filtering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredIdeas {
    /// Zero-based input row of each kept idea, parallel to `ideas`.
    pub rows: Vec<usize>,
    pub ideas: Vec<ScoredIdea>,
}

impl FilteredIdeas {
    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }

    /// 1-based input row number for a position in `ideas`.
    pub fn row_number(&self, position: usize) -> usize {
        self.rows.get(position).copied().unwrap_or(position) + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    ProbSuccess,
    ProjectedUsers,
    DevWeeks,
    BestPrice,
    ExpectedRevenue,
    ExpectedProfit,
}

impl SortKey {
    pub const NAMES: [&'static str; 6] = PRICING_REPORT_COLUMNS;

    pub fn name(self) -> &'static str {
        match self {
            Self::ProbSuccess => "prob_success",
            Self::ProjectedUsers => "projected_users",
            Self::DevWeeks => "dev_weeks",
            Self::BestPrice => "best_price",
            Self::ExpectedRevenue => "expected_revenue",
            Self::ExpectedProfit => "expected_profit",
        }
    }

    fn value(self, idea: &ScoredIdea) -> f64 {
        match self {
            Self::ProbSuccess => idea.prob_success,
            Self::ProjectedUsers => idea.projected_users,
            Self::DevWeeks => idea.dev_weeks,
            Self::BestPrice => idea.best_price,
            Self::ExpectedRevenue => idea.expected_revenue,
            Self::ExpectedProfit => idea.expected_profit,
        }
    }
}

impl FromStr for SortKey {
    type Err = ReportError;

    /// Parses a report column name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        [
            Self::ProbSuccess,
            Self::ProjectedUsers,
            Self::DevWeeks,
            Self::BestPrice,
            Self::ExpectedRevenue,
            Self::ExpectedProfit,
        ]
        .into_iter()
        .find(|key| key.name().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ReportError::UnknownSortKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Stable sort of a copy of `ideas`; equal keys keep their input order.
pub fn sorted(ideas: &[ScoredIdea], key: SortKey, order: SortOrder) -> Vec<ScoredIdea> {
    let mut out = ideas.to_vec();
    out.sort_by(|a, b| {
        let ord = key.value(a).total_cmp(&key.value(b));
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
    out
}

/// Formats a dollar amount with thousands separators and two decimals.
pub fn format_money(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

fn scored_record(idea: &ScoredIdea) -> [String; 6] {
    [
        format!("{:.6}", idea.prob_success),
        format!("{}", idea.projected_users.round()),
        format!("{}", idea.dev_weeks.round()),
        format!("{:.2}", idea.best_price),
        format!("{:.2}", idea.expected_revenue),
        format!("{:.2}", idea.expected_profit),
    ]
}

/// Writes the full pricing report, one row per scored idea.
pub fn write_pricing_report<W: Write>(writer: W, ideas: &[ScoredIdea]) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(PRICING_REPORT_COLUMNS)?;
    for idea in ideas {
        wtr.write_record(scored_record(idea))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the chosen rows of a portfolio, prefixed with their 1-based input row.
/// `selection` indexes into `batch.ideas`.
pub fn write_portfolio<W: Write>(
    writer: W,
    batch: &FilteredIdeas,
    selection: &PortfolioSelection,
) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["idea"];
    header.extend(PRICING_REPORT_COLUMNS);
    wtr.write_record(&header)?;
    for &index in &selection.indices {
        if let Some(idea) = batch.ideas.get(index) {
            let mut row = vec![batch.row_number(index).to_string()];
            row.extend(scored_record(idea));
            wtr.write_record(&row)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one `prob_success` column with six decimals.
pub fn write_predictions<W: Write>(writer: W, probabilities: &[f64]) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["prob_success"])?;
    for p in probabilities {
        wtr.write_record([format!("{p:.6}")])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the pricing-only report for precomputed probabilities.
pub fn write_price_points<W: Write>(
    writer: W,
    rows: &[(PricingInput, PricePoint)],
) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "prob_success",
        "projected_users",
        "best_price",
        "expected_revenue",
        "expected_profit",
    ])?;
    for (input, point) in rows {
        wtr.write_record([
            format!("{:.6}", input.prob_success),
            format!("{}", input.projected_users.trunc()),
            format!("{:.2}", point.price),
            format!("{:.2}", point.revenue),
            format!("{:.2}", point.profit),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the plain-text product brief.
pub fn write_brief<W: Write>(
    mut writer: W,
    summary: &Summary,
    unit_cost: f64,
) -> Result<(), ReportError> {
    writeln!(writer, "IdeaRanker Product Brief")?;
    writeln!(writer, "=======================")?;
    writeln!(writer)?;
    writeln!(writer, "Ideas scored: {}", summary.count)?;
    writeln!(
        writer,
        "Success probability: min={:.3} avg={:.3} max={:.3}",
        summary.prob_min, summary.prob_avg, summary.prob_max
    )?;
    writeln!(
        writer,
        "Total expected revenue (naive curve): {}",
        format_money(summary.total_revenue)
    )?;
    writeln!(
        writer,
        "Total expected profit (unit_cost={unit_cost:?}): {}",
        format_money(summary.total_profit)
    )?;
    writeln!(writer)?;
    writeln!(writer, "Recommendations")?;
    writeln!(writer, "- Prioritize ideas with prob_success >= 0.7")?;
    writeln!(
        writer,
        "- Deprioritize ideas with development time > 16 weeks unless prob_success >= 0.85"
    )?;
    writeln!(
        writer,
        "- Use best_price as a starting point; validate with A/B tests and user research"
    )?;
    writer.flush()?;
    Ok(())
}
