//! Key Paths
//!
//! This crate holds the variables bound to a document template and resolves
//! dotted key paths against them.
//!
//! # Features
//!
//! - Insertion-ordered binding table with overwrite-in-place semantics
//! - Deep lookups into nested objects and arrays (`author.firstName`, `orders.0.id`)
//! - Case-insensitive key matching, with exact matches preferred
//! - Text rendering of bound values for substitution
//!
//! # Example
//!
//! ```rust
//! use keypath::{Bindings, KeyPathResolver, PathResolver, render_value};
//! use serde_json::json;
//!
//! let mut bindings = Bindings::new();
//! bindings.insert("author", json!({"firstName": "Jon"}));
//!
//! let value = PathResolver.resolve("author.firstname", &bindings, true).unwrap();
//! assert_eq!(render_value(value), "Jon");
//! ```

mod bindings;
mod error;
mod resolver;
mod value;

pub use bindings::Bindings;
pub use error::{KeyPathError, Result};
pub use resolver::{KeyPath, KeyPathResolver, PathResolver};
pub use value::{render_value, type_name};

// Bound values are plain JSON values
pub use serde_json::Value;
