//! Schema data structures.
//!
//! A [`Schema`] is the long-lived reference contract for a dataset. Once
//! built it is never mutated: validation reads it and produces a report,
//! and only an explicit re-inference replaces it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::stats::FeatureType;
use crate::{Result, StatguardError};

/// Whether a feature may contain missing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "requirement", rename_all = "lowercase")]
pub enum Presence {
    /// Every row must carry a value
    Required,
    /// Missing values allowed up to the recorded fraction
    Optional {
        /// Largest missing fraction seen when the schema was built
        max_missing_fraction: f64,
    },
}

impl Presence {
    /// Returns true for [`Presence::Required`].
    pub fn is_required(&self) -> bool {
        matches!(self, Presence::Required)
    }
}

/// Accepted closed interval of numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Smallest accepted value
    pub min: f64,
    /// Largest accepted value
    pub max: f64,
}

impl NumericRange {
    /// Creates a new range.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns true if `[min, max]` lies within this range.
    pub fn covers(&self, min: f64, max: f64) -> bool {
        min >= self.min && max <= self.max
    }
}

/// Accepted values of a categorical feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Known values
    pub values: Vec<String>,
    /// Whether values outside `values` are tolerated
    pub open: bool,
    /// For open domains, the largest tolerated fraction of unknown values
    pub max_unknown_fraction: f64,
}

impl Domain {
    /// Creates a closed domain: any value outside `values` is unexpected.
    pub fn closed<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            open: false,
            max_unknown_fraction: 0.0,
        }
    }

    /// Creates an open domain tolerating up to `max_unknown_fraction` of
    /// unknown values.
    pub fn open<I, S>(values: I, max_unknown_fraction: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            open: true,
            max_unknown_fraction,
        }
    }

    /// Returns true if `value` is a known domain value.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// Expectations for a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConstraint {
    /// Feature name
    pub name: String,
    /// Required type
    pub feature_type: FeatureType,
    /// Presence requirement
    pub presence: Presence,
    /// Accepted range, numeric features only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<NumericRange>,
    /// Accepted domain, categorical/string features only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
}

impl FeatureConstraint {
    /// Creates a required constraint of the given type with no range or
    /// domain.
    pub fn new(name: impl Into<String>, feature_type: FeatureType) -> Self {
        Self {
            name: name.into(),
            feature_type,
            presence: Presence::Required,
            range: None,
            domain: None,
        }
    }

    /// Builder method to set the presence requirement.
    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    /// Builder method to set the accepted numeric range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some(NumericRange::new(min, max));
        self
    }

    /// Builder method to set the accepted domain.
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Whether the declared type was observed rather than defaulted.
    ///
    /// Inference over a feature that was always missing yields an unbounded
    /// numeric constraint that may be missing entirely; its type carries no
    /// evidence and is not enforced.
    pub fn has_type_evidence(&self) -> bool {
        let defaulted = self.feature_type == FeatureType::Numeric
            && self.range.is_none()
            && self.domain.is_none()
            && matches!(
                self.presence,
                Presence::Optional { max_missing_fraction } if max_missing_fraction >= 1.0
            );
        !defaulted
    }

    fn check(&self) -> Result<()> {
        if let Presence::Optional {
            max_missing_fraction,
        } = self.presence
            && !(0.0..=1.0).contains(&max_missing_fraction)
        {
            return Err(StatguardError::malformed_feature(
                &self.name,
                format!("max_missing_fraction {} outside [0, 1]", max_missing_fraction),
            ));
        }

        if let Some(range) = &self.range {
            if self.feature_type != FeatureType::Numeric {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    format!("numeric range on a {} feature", self.feature_type),
                ));
            }
            if !range.min.is_finite() || !range.max.is_finite() {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    "non-finite range bound",
                ));
            }
            if range.min > range.max {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    format!("range min {} exceeds max {}", range.min, range.max),
                ));
            }
        }

        if let Some(domain) = &self.domain {
            if !self.feature_type.is_textual() {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    format!("value domain on a {} feature", self.feature_type),
                ));
            }
            if !(0.0..=1.0).contains(&domain.max_unknown_fraction) {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    format!(
                        "max_unknown_fraction {} outside [0, 1]",
                        domain.max_unknown_fraction
                    ),
                ));
            }
        }

        Ok(())
    }
}

/// What to do with features that the schema does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewFeaturePolicy {
    /// Ignore unknown features
    Allow,
    /// Report unknown features as anomalies
    #[default]
    Flag,
}

/// Declarative contract describing acceptable data, per feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    source_row_count: u64,
    new_features: NewFeaturePolicy,
    features: Vec<FeatureConstraint>,
}

impl Schema {
    /// Creates a schema after checking it for structural problems.
    ///
    /// # Arguments
    /// * `features` - Constraints in the order anomalies should be reported
    /// * `new_features` - Policy for features absent from the schema
    /// * `source_row_count` - Rows in the dataset the schema describes
    pub fn new(
        features: Vec<FeatureConstraint>,
        new_features: NewFeaturePolicy,
        source_row_count: u64,
    ) -> Result<Self> {
        let schema = Self {
            source_row_count,
            new_features,
            features,
        };
        schema.check()?;
        Ok(schema)
    }

    /// Feature constraints in schema order
    pub fn features(&self) -> &[FeatureConstraint] {
        &self.features
    }

    /// Looks up a feature constraint by name
    pub fn feature(&self, name: &str) -> Option<&FeatureConstraint> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Returns true if the schema has a constraint for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.feature(name).is_some()
    }

    /// Policy for features not in the schema
    pub fn new_features(&self) -> NewFeaturePolicy {
        self.new_features
    }

    /// Rows in the dataset the schema was built from
    pub fn source_row_count(&self) -> u64 {
        self.source_row_count
    }

    /// Checks that feature names are unique and every constraint is
    /// internally consistent.
    ///
    /// Deserialized schemas bypass [`Schema::new`], so loaders must call this.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.name.as_str()) {
                return Err(StatguardError::structural(format!(
                    "duplicate feature '{}' in schema",
                    feature.name
                )));
            }
            feature.check()?;
        }
        Ok(())
    }
}
