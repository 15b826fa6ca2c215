//! # SenML Codec - Sensor Measurement Lists for Rust
//!
//! Converts between SenML+JSON ([RFC 8428](https://tools.ietf.org/html/rfc8428))
//! arrays and typed records.
//!
//! The codec consumes already-parsed [`serde_json::Value`]s and produces
//! values ready for any JSON writer. The first element of a document can
//! carry base fields (`bn`, `bt`, `bu`, `bv`) that apply to every record;
//! decoded records keep a shared reference to that base and can be merged
//! with it on demand.
//!
//! ## Quick Start
//!
//! ```rust
//! use senml_codec::{Document, Result};
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let raw = json!([
//!         {"bn": "urn:dev:mac:0b92569229fc9e68/rpm/", "bt": 0, "bu": "1/min",
//!          "bver": 5, "n": "fwd", "v": 17.666544, "s": 3, "t": 0},
//!         {"n": "rev", "v": 17.666544, "s": 4, "t": 0}
//!     ]);
//!
//!     let doc = Document::from_value(&raw)?;
//!     let rev = &doc.resolved()[1];
//!     assert_eq!(rev.name.as_deref(), Some("urn:dev:mac:0b92569229fc9e68/rpm/rev"));
//!
//!     let encoded = doc.encode()?;
//!     assert_eq!(encoded.len(), 2);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Wire fields
//!
//! - **Base fields**: `bn`, `bt`, `bu`, `bv`, plus the `bver` version marker
//! - **Record fields**: `n`, `t`, `u`, `s`, and one of `v`, `vs`, `vb`, `vd`

pub mod builder;
pub mod config;
pub mod document;
pub mod error;
pub mod json;
pub mod measurement;
pub mod numeric;
pub mod value;

// Re-export main types
pub use builder::DocumentBuilder;
pub use config::{Config, OpaqueEncoding};
pub use document::Document;
pub use error::{Result, SenMLError};
pub use measurement::Measurement;
pub use numeric::{normalize, Numeric};
pub use value::Value;
