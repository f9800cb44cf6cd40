//! Stable exit codes for the discovery CLI.

/// Command succeeded.
pub const OK: i32 = 0;
/// `validate` found violations, or an unexpected error occurred.
pub const INVALID: i32 = 1;
/// Invalid flags, config file, or tag spec.
pub const CONFIG: i32 = 2;
/// A load balancer or inventory lookup failed.
pub const LOOKUP: i32 = 3;
/// Target groups could not be encoded.
pub const ENCODE: i32 = 4;
/// Writing or renaming the output document failed.
pub const PUBLISH: i32 = 5;
