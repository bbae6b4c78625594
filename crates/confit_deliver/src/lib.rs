//! Safe file delivery for confit.
//!
//! Takes rendered bytes and a destination path and installs the content with
//! copy-module semantics: checksum-based change detection, optional backup of
//! the prior file, optional validation of the staged content, check (dry-run)
//! mode, diff reporting, and an atomic commit. The destination is never
//! observable in a half-written state.

pub mod diff;
pub mod error;
pub mod manager;
pub mod options;
pub mod result;

pub use diff::line_diff;
pub use error::{DeliverError, DeliverResult};
pub use manager::DeliveryManager;
pub use options::DeliveryOptions;
pub use result::DeliveryResult;
