//! Prompt library import and export.
//!
//! - `codec` - decoding library text into records and rendering exports
//! - `merger` - reconciling incoming records against stored prompts

mod codec;
mod merger;

pub use codec::{build_export, parse_library};
pub use merger::{LibraryMerger, unique_name};
