//! In-memory columnar dataset representation.
//!
//! A [`Dataset`] is an ordered list of named [`Column`]s of equal length.
//! Row `i` across all columns is one logical record. The engine only ever
//! reads datasets; preprocessing steps build new ones.

use std::collections::HashSet;

use crate::{Result, StatguardError};

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Numeric value. Non-finite numbers are treated as missing.
    Number(f64),
    /// Text value, possibly a number in textual form (e.g. read from CSV)
    Text(String),
    /// Missing value
    Missing,
}

impl Value {
    /// Returns the value as a finite number, parsing text if needed.
    ///
    /// Returns `None` for missing values, non-finite numbers and text that
    /// does not parse as a float.
    pub fn as_finite_number(&self) -> Option<f64> {
        let numeric = match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Missing => None,
        };
        numeric.filter(|v| v.is_finite())
    }

    /// Returns true if the value counts as missing.
    ///
    /// Besides [`Value::Missing`], NaN and infinities (numeric or textual such
    /// as `"NaN"`) are missing: they carry no usable measurement.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => !n.is_finite(),
            Value::Text(s) => matches!(s.trim().parse::<f64>(), Ok(v) if !v.is_finite()),
        }
    }

    /// Textual rendering used for categorical statistics.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Number(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Missing => None,
        }
    }

    /// Key that identifies the value exactly, used for duplicate detection.
    pub(crate) fn identity_key(&self) -> String {
        match self {
            Value::Number(n) => format!("n:{:016x}", n.to_bits()),
            Value::Text(s) => format!("t:{}", s),
            Value::Missing => "m".to_string(),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Missing, Into::into)
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a column from anything convertible into [`Value`].
    ///
    /// ```rust
    /// use statguard_core::dataset::{Column, Value};
    ///
    /// let column = Column::from_values("rating", [Some(4.0), None, Some(5.0)]);
    /// assert_eq!(column.values()[1], Value::Missing);
    /// ```
    pub fn from_values<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(name, values.into_iter().map(Into::into).collect())
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column values in row order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of rows in the column
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column has no rows
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered collection of equal-length named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Creates a dataset, checking that column names are unique and all
    /// columns have the same length.
    ///
    /// A dataset with zero columns is structurally valid here; the statistics
    /// computer rejects it separately.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(StatguardError::structural(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(StatguardError::structural(format!(
                    "column '{}' has {} rows, expected {} (from column '{}')",
                    bad.name,
                    bad.len(),
                    expected,
                    first.name
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Builds a dataset from a header and row-major records.
    ///
    /// Every record must have exactly one value per header.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut columns: Vec<Vec<Value>> = headers
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != headers.len() {
                return Err(StatguardError::structural(format!(
                    "row {} has {} values, expected {}",
                    index,
                    row.len(),
                    headers.len()
                )));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        Self::new(
            headers
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    /// Columns in dataset order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in dataset order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows (zero when there are no columns)
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Returns the values of row `index` in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Builds a new dataset containing the given rows, in the given order.
    ///
    /// Indices may repeat (used by oversampling).
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let rows = self.row_count();
        if let Some(bad) = indices.iter().find(|&&i| i >= rows) {
            return Err(StatguardError::structural(format!(
                "row index {} out of bounds for {} rows",
                bad, rows
            )));
        }

        let columns = self
            .columns
            .iter()
            .map(|c| {
                Column::new(
                    c.name.clone(),
                    indices.iter().map(|&i| c.values[i].clone()).collect(),
                )
            })
            .collect();

        Ok(Self { columns })
    }

    /// Returns a new dataset with `column` added, replacing any existing
    /// column of the same name in place.
    pub fn with_column(&self, column: Column) -> Result<Self> {
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => columns.push(column),
        }
        Self::new(columns)
    }

    /// Appends the rows of `other`, which must have the same column names in
    /// the same order.
    pub fn append(&self, other: &Dataset) -> Result<Self> {
        if self.column_names() != other.column_names() {
            return Err(StatguardError::structural(
                "cannot append datasets with different columns",
            ));
        }

        let columns = self
            .columns
            .iter()
            .zip(&other.columns)
            .map(|(a, b)| {
                let mut values = a.values.clone();
                values.extend(b.values.iter().cloned());
                Column::new(a.name.clone(), values)
            })
            .collect();

        Ok(Self { columns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_numeric_parsing() {
        assert_eq!(Value::from(4.5).as_finite_number(), Some(4.5));
        assert_eq!(Value::from(" 3 ").as_finite_number(), Some(3.0));
        assert_eq!(Value::from("abc").as_finite_number(), None);
        assert_eq!(Value::Missing.as_finite_number(), None);
        assert_eq!(Value::from(f64::NAN).as_finite_number(), None);
    }

    #[test]
    fn test_value_missing_detection() {
        assert!(Value::Missing.is_missing());
        assert!(Value::from(f64::NAN).is_missing());
        assert!(Value::from(f64::INFINITY).is_missing());
        assert!(Value::from("NaN").is_missing());
        assert!(Value::from("inf").is_missing());
        assert!(!Value::from("").is_missing());
        assert!(!Value::from("text").is_missing());
        assert!(!Value::from(0.0).is_missing());
    }

    #[test]
    fn test_value_render() {
        assert_eq!(Value::from(5.0).render().as_deref(), Some("5"));
        assert_eq!(Value::from(2.5).render().as_deref(), Some("2.5"));
        assert_eq!(Value::from("Books").render().as_deref(), Some("Books"));
        assert_eq!(Value::Missing.render(), None);
    }

    #[test]
    fn test_dataset_rejects_unequal_lengths() {
        let result = Dataset::new(vec![
            Column::from_values("a", [1.0, 2.0]),
            Column::from_values("b", [1.0]),
        ]);
        assert!(matches!(
            result,
            Err(StatguardError::StructuralInput { .. })
        ));
    }

    #[test]
    fn test_dataset_rejects_duplicate_names() {
        let result = Dataset::new(vec![
            Column::from_values("a", [1.0]),
            Column::from_values("a", [2.0]),
        ]);
        assert!(matches!(
            result,
            Err(StatguardError::StructuralInput { .. })
        ));
    }

    #[test]
    fn test_dataset_from_rows() {
        let dataset = Dataset::from_rows(
            vec!["id".to_string(), "category".to_string()],
            vec![
                vec![Value::from(1.0), Value::from("A")],
                vec![Value::from(2.0), Value::Missing],
            ],
        )
        .unwrap();

        assert_eq!(dataset.column_count(), 2);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column("category").unwrap().values()[1], Value::Missing);
        assert_eq!(dataset.row(0).unwrap(), vec![&Value::from(1.0), &Value::from("A")]);
        assert!(dataset.row(2).is_none());
    }

    #[test]
    fn test_dataset_from_rows_rejects_ragged_rows() {
        let result = Dataset::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Value::from(1.0)]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_select_rows_allows_repeats() {
        let dataset = Dataset::new(vec![Column::from_values("a", [1.0, 2.0, 3.0])]).unwrap();
        let selected = dataset.select_rows(&[2, 2, 0]).unwrap();
        assert_eq!(
            selected.column("a").unwrap().values(),
            &[Value::from(3.0), Value::from(3.0), Value::from(1.0)]
        );
        assert!(dataset.select_rows(&[3]).is_err());
    }

    #[test]
    fn test_with_column_replaces_in_place() {
        let dataset = Dataset::new(vec![
            Column::from_values("a", [1.0]),
            Column::from_values("b", [2.0]),
        ])
        .unwrap();

        let replaced = dataset.with_column(Column::from_values("a", [9.0])).unwrap();
        assert_eq!(replaced.column_names(), vec!["a", "b"]);
        assert_eq!(replaced.column("a").unwrap().values(), &[Value::from(9.0)]);

        let appended = dataset.with_column(Column::from_values("c", [3.0])).unwrap();
        assert_eq!(appended.column_names(), vec!["a", "b", "c"]);

        assert!(dataset.with_column(Column::from_values("d", [1.0, 2.0])).is_err());
    }

    #[test]
    fn test_append_requires_same_columns() {
        let a = Dataset::new(vec![Column::from_values("x", [1.0])]).unwrap();
        let b = Dataset::new(vec![Column::from_values("x", [2.0])]).unwrap();
        let c = Dataset::new(vec![Column::from_values("y", [2.0])]).unwrap();

        assert_eq!(a.append(&b).unwrap().row_count(), 2);
        assert!(a.append(&c).is_err());
    }

    #[test]
    fn test_empty_dataset_row_count() {
        let dataset = Dataset::new(Vec::new()).unwrap();
        assert_eq!(dataset.row_count(), 0);
        assert_eq!(dataset.column_count(), 0);
    }
}
