//! Schema model and inference.
//!
//! A schema records, per feature, the expected type, whether values may be
//! missing, the accepted numeric range and the accepted categorical domain,
//! plus a global policy for features the schema does not know.
//!
//! # Example
//! ```rust
//! use statguard_core::dataset::{Column, Dataset};
//! use statguard_core::schema::{Presence, SchemaInferrer};
//! use statguard_core::stats::StatisticsComputer;
//!
//! let dataset = Dataset::new(vec![Column::from_values("rating", [1.0, 4.0, 5.0])])?;
//! let stats = StatisticsComputer::with_defaults().compute(&dataset)?;
//! let schema = SchemaInferrer::with_defaults().infer(&stats)?;
//!
//! assert_eq!(schema.feature("rating").unwrap().presence, Presence::Required);
//! # Ok::<(), statguard_core::StatguardError>(())
//! ```

mod config;
mod inference;
mod models;

pub use config::InferenceConfig;
pub use inference::SchemaInferrer;
pub use models::{
    Domain, FeatureConstraint, NewFeaturePolicy, NumericRange, Presence, Schema,
};
