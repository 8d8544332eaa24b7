//! # survival concordance
//!
//! c-index for right-censored survival data, w/ bootstrap confidence intervals
//!
//! ## what you get
//!
//! - concordant / discordant / tied pair counts in O(n log n)
//! - two pair conventions: censoring-aware Harrell, or the simpler all-pairs rule
//! - percentile bootstrap intervals that reproduce bit-for-bit under a seed
//! - parallel resampling when you want it (`parallel` feature)
//!
//! ## quick start
//!
//! ```rust
//! use survival_concordance::{BootstrapEstimator, Convention, SurvivalData, concordance_index};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let times = vec![1.0, 3.0, 4.0, 6.0, 9.0];
//! let events = vec![true, true, false, true, true]; // false = censored
//! let risks = vec![6.0, 3.0, 5.0, 2.0, 4.0];       // higher = expected to fail sooner
//! let data = SurvivalData::new(times, events, risks)?;
//!
//! let c = concordance_index(&data, Convention::Harrell);
//! assert!(c.is_some());
//!
//! let interval = BootstrapEstimator::new()
//!     .with_num_samples(200)
//!     .with_seed(3045)
//!     .estimate(&data)?;
//! assert!(interval.ci_lower <= interval.ci_upper);
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod concordance;
pub mod config;
pub mod data;
pub mod error;

pub use bootstrap::{bootstrap_c_index, BootstrapEstimator, BootstrapInterval};
pub use concordance::{
    c_index, classify_pair, concordance_index, count_pairs, count_pairs_exhaustive,
    ComparisonOutcome, Convention, PairCounts,
};
pub use config::BootstrapConfig;
pub use data::{Subject, SurvivalData};
pub use error::{ConcordanceError, Result};
