//! Event thresholds for building contingency tables from continuous values.
//!
//! A [`SingleThresh`] answers `check(value, climo_mean, climo_stdev)` and
//! defines a yes/no event. A [`ThreshArray`] holds N monotonic thresholds and
//! maps a value to one of N+1 categories with [`ThreshArray::check_bins`].
//!
//! ```
//! use verif_thresh::{SingleThresh, ThreshArray};
//!
//! let t: SingleThresh = ">=5".parse().unwrap();
//! assert!(t.check(5.0, None, None));
//!
//! let bins: ThreshArray = ">=1,>=5".parse().unwrap();
//! assert_eq!(bins.check_bins(3.0, None, None), 1);
//! ```

mod array;
mod error;
mod op;
mod single;

pub use array::ThreshArray;
pub use error::ThreshError;
pub use op::ThreshOp;
pub use single::{SingleThresh, ThreshValue};
