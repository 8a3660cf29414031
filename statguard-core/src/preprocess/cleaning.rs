//! Row filtering and column transformations.
//!
//! Every operation takes a dataset by reference and returns a new one.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use regex::Regex;
use tracing::{debug, info};

use crate::dataset::{Column, Dataset, Value};
use crate::{Result, StatguardError};

/// Characters stripped by [`normalize_text`].
const PUNCTUATION_PATTERN: &str = r"[^\w\s]";

/// Maps numeric values up to an inclusive upper bound onto a label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelBin {
    /// Inclusive upper bound
    pub upper: f64,
    /// Label assigned to values in this bin
    pub label: String,
}

impl LabelBin {
    /// Creates a bin.
    pub fn new(upper: f64, label: impl Into<String>) -> Self {
        Self {
            upper,
            label: label.into(),
        }
    }
}

/// Sentiment of a star rating, truncated toward zero first.
fn star_sentiment(rating: f64) -> &'static str {
    let stars = rating.trunc();
    if (1.0..3.0).contains(&stars) {
        "negative"
    } else if (3.0..4.0).contains(&stars) {
        "neutral"
    } else {
        "positive"
    }
}

fn require_column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column> {
    dataset
        .column(name)
        .ok_or_else(|| StatguardError::structural(format!("unknown column '{}'", name)))
}

/// Removes exact duplicate rows, keeping the first occurrence.
pub fn drop_duplicates(dataset: &Dataset) -> Result<Dataset> {
    let mut seen = HashSet::new();
    let keep: Vec<usize> = (0..dataset.row_count())
        .filter(|&i| {
            let key: Vec<String> = dataset
                .columns()
                .iter()
                .map(|c| c.values()[i].identity_key())
                .collect();
            seen.insert(key)
        })
        .collect();

    let dropped = dataset.row_count() - keep.len();
    if dropped > 0 {
        info!("Dropped {} duplicate rows", dropped);
    }
    dataset.select_rows(&keep)
}

/// Removes rows with a missing value in any of `columns`.
///
/// # Errors
/// Returns a structural error if a listed column does not exist.
pub fn drop_missing(dataset: &Dataset, columns: &[&str]) -> Result<Dataset> {
    let subset = columns
        .iter()
        .map(|name| require_column(dataset, name))
        .collect::<Result<Vec<_>>>()?;

    let keep: Vec<usize> = (0..dataset.row_count())
        .filter(|&i| subset.iter().all(|c| !c.values()[i].is_missing()))
        .collect();

    let dropped = dataset.row_count() - keep.len();
    if dropped > 0 {
        info!(
            "Dropped {} rows with missing values in [{}]",
            dropped,
            columns.join(", ")
        );
    }
    dataset.select_rows(&keep)
}

/// Lowercases text in `column` and strips everything that is neither a word
/// character nor whitespace.
///
/// Numbers and missing values are left untouched.
pub fn normalize_text(dataset: &Dataset, column: &str) -> Result<Dataset> {
    let source = require_column(dataset, column)?;
    let punctuation = Regex::new(PUNCTUATION_PATTERN)
        .map_err(|e| StatguardError::configuration(format!("invalid text pattern: {}", e)))?;

    let values = source
        .values()
        .iter()
        .map(|value| match value {
            Value::Text(text) => {
                Value::Text(punctuation.replace_all(&text.to_lowercase(), "").into_owned())
            }
            other => other.clone(),
        })
        .collect();

    debug!("Normalized text in column '{}'", column);
    dataset.with_column(Column::new(column, values))
}

/// Orders category values: numbers first by value, then text lexically.
fn category_order(a: &Value, b: &Value) -> Ordering {
    match (a.as_finite_number(), b.as_finite_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.render().cmp(&b.render()),
    }
}

/// Writes integer codes for the values of `column` into `target`.
///
/// Codes follow the sorted order of the distinct values. Missing values stay
/// missing.
pub fn encode_categorical(dataset: &Dataset, column: &str, target: &str) -> Result<Dataset> {
    let source = require_column(dataset, column)?;

    let mut distinct: Vec<&Value> = Vec::new();
    let mut seen = HashSet::new();
    for value in source.values().iter().filter(|v| !v.is_missing()) {
        if seen.insert(value.identity_key()) {
            distinct.push(value);
        }
    }
    distinct.sort_by(|a, b| category_order(a, b));

    let codes: HashMap<String, usize> = distinct
        .iter()
        .enumerate()
        .map(|(code, value)| (value.identity_key(), code))
        .collect();

    let values = source
        .values()
        .iter()
        .map(|value| {
            if value.is_missing() {
                return Value::Missing;
            }
            codes
                .get(&value.identity_key())
                .map_or(Value::Missing, |&code| Value::Number(code as f64))
        })
        .collect();

    info!(
        "Encoded {} categories of '{}' into '{}'",
        distinct.len(),
        column,
        target
    );
    dataset.with_column(Column::new(target, values))
}

/// Derives a label column from a numeric column.
///
/// A value gets the label of the first bin whose upper bound is at least the
/// value. Values that are missing, non-numeric or above every bound get no
/// label.
///
/// # Errors
/// Returns a configuration error if `bins` is empty or its bounds are not
/// strictly increasing.
pub fn derive_labels(
    dataset: &Dataset,
    source: &str,
    target: &str,
    bins: &[LabelBin],
) -> Result<Dataset> {
    if bins.is_empty() {
        return Err(StatguardError::configuration("label bins must not be empty"));
    }
    if bins.windows(2).any(|pair| pair[0].upper >= pair[1].upper) {
        return Err(StatguardError::configuration(
            "label bin bounds must be strictly increasing",
        ));
    }

    let column = require_column(dataset, source)?;
    let values = column
        .values()
        .iter()
        .map(|value| {
            value
                .as_finite_number()
                .and_then(|x| bins.iter().find(|bin| x <= bin.upper))
                .map_or(Value::Missing, |bin| Value::Text(bin.label.clone()))
        })
        .collect();

    info!("Derived labels '{}' from '{}'", target, source);
    dataset.with_column(Column::new(target, values))
}

/// Labels star ratings with review sentiment.
///
/// Ratings are truncated to whole stars: 1 and 2 are negative, 3 is neutral
/// and every other rating, 0 included, is positive. Missing or non-numeric
/// ratings get no label.
pub fn derive_sentiment(dataset: &Dataset, source: &str, target: &str) -> Result<Dataset> {
    let column = require_column(dataset, source)?;
    let values = column
        .values()
        .iter()
        .map(|value| {
            value
                .as_finite_number()
                .map_or(Value::Missing, |rating| Value::Text(star_sentiment(rating).into()))
        })
        .collect();

    info!("Derived sentiment '{}' from '{}'", target, source);
    dataset.with_column(Column::new(target, values))
}
