//! Shared wire types for the careboard data-access layer.
//!
//! Everything that crosses the dispatcher boundary is expressed in terms of
//! these types: an HTTP-like [`Method`], and a [`Params`] map carrying the
//! filter parameters of a request.

mod method;
mod params;

pub use method::Method;
pub use params::{Params, query_pairs};
