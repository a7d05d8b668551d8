#![deny(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! Potato leaf disease classification backed by a Gemini vision model.
//!
//! [`LeafAnalyzer`] turns an image into an [`AnalysisResult`]; [`AnalysisSession`] keeps
//! the state a front end shows while that happens.

mod acquire;
mod analyzer;
mod compress;
mod data_url;
mod error;
mod extract;
mod request;
mod session;
mod verdict;

pub use acquire::RawImage;
pub use analyzer::LeafAnalyzer;
pub use compress::*;
pub use data_url::{DataUrl, encode_data_url};
pub use error::*;
pub use extract::*;
pub use request::*;
pub use session::*;
pub use verdict::*;
