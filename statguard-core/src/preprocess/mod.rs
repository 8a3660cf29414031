//! Dataset preparation ahead of profiling.
//!
//! Cleaning steps remove duplicate and incomplete rows, normalize text and
//! derive encoded or labelled columns. Class balancing runs through a
//! pluggable [`Resampler`] gated by an [`ImbalancePolicy`].
//!
//! # Example
//! ```rust
//! use statguard_core::dataset::{Column, Dataset};
//! use statguard_core::preprocess::{
//!     derive_sentiment, drop_duplicates, rebalance, ImbalancePolicy, RandomOversampler,
//! };
//!
//! let raw = Dataset::new(vec![
//!     Column::from_values("star_rating", [5.0, 5.0, 4.0, 1.0, 5.0]),
//!     Column::from_values("review_id", [1.0, 1.0, 2.0, 3.0, 4.0]),
//! ])?;
//!
//! let cleaned = drop_duplicates(&raw)?;
//! let labelled = derive_sentiment(&cleaned, "star_rating", "sentiment")?;
//! let balanced = rebalance(
//!     &labelled,
//!     "sentiment",
//!     &ImbalancePolicy::default(),
//!     &RandomOversampler::default(),
//! )?;
//! assert_eq!(balanced.row_count(), 6);
//! # Ok::<(), statguard_core::StatguardError>(())
//! ```

mod cleaning;
mod resample;

pub use cleaning::{
    LabelBin, derive_labels, derive_sentiment, drop_duplicates, drop_missing, encode_categorical,
    normalize_text,
};
pub use resample::{
    ClassIndex, DEFAULT_IMBALANCE_RATIO, DEFAULT_K_NEIGHBORS, DEFAULT_SEED, ImbalancePolicy,
    NoResampling, RandomOversampler, Resampler, SmoteOversampler, class_imbalance_ratio,
    rebalance,
};
