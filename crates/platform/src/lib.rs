//! # Ferry Platform
//!
//! Shared platform types for the ferry SSH proxy.
//!
//! This crate provides the unified error type (`FerryError`, `FerryResult`)
//! used across the workspace.
//!
//! # Examples
//!
//! ```
//! use ferry_platform::{FerryError, FerryResult};
//!
//! fn example_function() -> FerryResult<String> {
//!     Ok("Hello, ferry!".to_string())
//! }
//!
//! # fn main() -> FerryResult<()> {
//! let result = example_function()?;
//! assert_eq!(result, "Hello, ferry!");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod error;

pub use error::{FerryError, FerryResult};

/// Platform version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
