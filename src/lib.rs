//! tfconv converts Terraform configuration between its JSON representation, TerraHub component
//! descriptors and native HCL syntax.
//!
//! The JSON to HCL direction is handled by [`render::Renderer`], a recursive walker which tracks
//! the Terraform block type and nesting level to decide how each key is emitted. The HCL to JSON
//! direction is handled by [`convert`], which converts the document parsed by `hcl-rs` while
//! preserving interpolations and raw expressions as `${...}` wrapped strings.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use tfconv::render::{reformat, Renderer};
//!
//! let value = json!({"provider": {"aws": {"region": "us-east-1"}}});
//! let hcl = reformat(&Renderer::new().render(&value));
//!
//! assert_eq!(hcl, "provider \"aws\" {\n  region = \"us-east-1\"\n}\n");
//! ```

#![warn(missing_docs)]

pub mod component;
pub mod convert;
mod encoding;
mod error;
pub mod render;
mod source;

pub use encoding::{detect_encoding, Encoding};
pub use error::{Error, Result};
pub use source::Source;
