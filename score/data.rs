//! # Data Loading Module
//!
//! This module is the entry point for user-provided idea tables. It reads
//! comma-separated files, checks the header against the fixed template, and
//! turns every row into an [`Idea`].
//!
//! - Strict Schema: the ideas header must be exactly the template columns, in
//!   order, compared case-insensitively.
//! - Lossy Fields: individual cells never fail a load. Empty, missing or
//!   non-numeric cells coerce to 0.0 so one bad cell cannot abort a batch.

use crate::types::{FEATURE_COLUMNS, Idea, coerce_feature};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// A comprehensive error type for all data loading failures.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid columns '{found}'. Expected the template header '{expected}'.")]
    InvalidHeader { found: String, expected: String },
    #[error(
        "The required column '{0}' was not found in the input file. Please check spelling."
    )]
    ColumnNotFound(String),
}

/// One row of a pricing-only input: a precomputed probability and a user count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingInput {
    pub prob_success: f64,
    pub projected_users: f64,
}

/// The ideas CSV header, joined with commas.
pub fn template_header() -> String {
    FEATURE_COLUMNS.join(",")
}

/// The built-in three-idea demo dataset.
pub fn demo_ideas() -> Vec<Idea> {
    vec![
        Idea::new(0.8, 0.8, 30000.0, 10.0, 0.7),
        Idea::new(0.4, 0.6, 12000.0, 12.0, 0.5),
        Idea::new(0.9, 0.5, 50000.0, 8.0, 0.4),
    ]
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Reads ideas from any CSV source.
pub fn read_ideas<R: Read>(reader: R) -> Result<Vec<Idea>, DataError> {
    let mut rdr = csv_reader(reader);

    let header: Vec<String> = rdr.headers()?.iter().map(str::to_ascii_lowercase).collect();
    if header.len() != FEATURE_COLUMNS.len()
        || header.iter().zip(FEATURE_COLUMNS).any(|(h, c)| h != c)
    {
        return Err(DataError::InvalidHeader {
            found: header.join(","),
            expected: template_header(),
        });
    }

    let mut ideas = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let mut features = [0.0; FEATURE_COLUMNS.len()];
        for (j, slot) in features.iter_mut().enumerate() {
            *slot = coerce_feature(record.get(j));
        }
        ideas.push(Idea::from_features(features));
    }

    log::debug!("Read {} ideas", ideas.len());
    Ok(ideas)
}

/// Loads and validates an ideas CSV file.
pub fn load_ideas(path: impl AsRef<Path>) -> Result<Vec<Idea>, DataError> {
    read_ideas(File::open(path)?)
}

/// Reads `prob_success,projected_users` rows from any CSV source. Column order is
/// free and names match case-insensitively; extra columns are ignored.
pub fn read_pricing_inputs<R: Read>(reader: R) -> Result<Vec<PricingInput>, DataError> {
    let mut rdr = csv_reader(reader);
    let header = rdr.headers()?.clone();
    let position = |name: &str| {
        header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))
    };
    let prob_col = position("prob_success")?;
    let users_col = position("projected_users")?;

    let mut inputs = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        inputs.push(PricingInput {
            prob_success: coerce_feature(record.get(prob_col)),
            projected_users: coerce_feature(record.get(users_col)),
        });
    }
    Ok(inputs)
}

/// Loads a pricing-only CSV file.
pub fn load_pricing_inputs(path: impl AsRef<Path>) -> Result<Vec<PricingInput>, DataError> {
    read_pricing_inputs(File::open(path)?)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> io::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{}", content)?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn loads_template_shaped_file() {
        let content = format!(
            "{}\n0.8,0.8,30000,10,0.7\n0.4,0.6,12000,12,0.5",
            template_header()
        );
        let file = create_test_csv(&content).unwrap();
        let ideas = load_ideas(file.path()).unwrap();
        assert_eq!(ideas, demo_ideas()[..2].to_vec());
    }

    #[test]
    fn header_match_is_case_insensitive() {
        let content = "Novelty_Score,FEASIBILITY_SCORE,projected_users,est_dev_weeks,prior_similar_success_rate\n1,1,1,1,1";
        let ideas = read_ideas(content.as_bytes()).unwrap();
        assert_eq!(ideas.len(), 1);
    }

    #[test]
    fn reordered_header_is_rejected() {
        let content = "feasibility_score,novelty_score,projected_users,est_dev_weeks,prior_similar_success_rate\n1,1,1,1,1";
        match read_ideas(content.as_bytes()) {
            Err(DataError::InvalidHeader { found, expected }) => {
                assert!(found.starts_with("feasibility_score"));
                assert_eq!(expected, template_header());
            }
            other => panic!("Expected InvalidHeader, got {other:?}"),
        }
    }

    #[test]
    fn bad_cells_coerce_to_zero() {
        let content = format!("{}\nabc,,30000,ten\n", template_header());
        let ideas = read_ideas(content.as_bytes()).unwrap();
        assert_eq!(ideas[0].features(), [0.0, 0.0, 30000.0, 0.0, 0.0]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let content = format!("{}\n\n1,2,3,4,5\n\n", template_header());
        let ideas = read_ideas(content.as_bytes()).unwrap();
        assert_eq!(ideas.len(), 1);
    }

    #[test]
    fn pricing_inputs_use_named_columns() {
        let content = "projected_users,note,PROB_SUCCESS\n30000,x,0.9\nbad,y,\n";
        let inputs = read_pricing_inputs(content.as_bytes()).unwrap();
        assert_eq!(
            inputs,
            vec![
                PricingInput {
                    prob_success: 0.9,
                    projected_users: 30000.0
                },
                PricingInput {
                    prob_success: 0.0,
                    projected_users: 0.0
                },
            ]
        );
    }

    #[test]
    fn pricing_inputs_require_probability_column() {
        let err = read_pricing_inputs("projected_users\n10\n".as_bytes()).unwrap_err();
        match err {
            DataError::ColumnNotFound(col) => assert_eq!(col, "prob_success"),
            other => panic!("Expected ColumnNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_ideas("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }
}
