//! Page model registry, contracts and the cached page loader.
//!
//! A page load flows: [`ModelConnector::load`] → dispatcher read →
//! registered transform → contract check → cache. Mutation connectors call
//! back into [`ModelConnector::clear_cache`] to invalidate every parameter
//! variant of an affected page.

mod connector;
mod contract;
mod error;
pub mod pages;
mod registry;

pub use connector::{LoadOptions, ModelConnector};
pub use contract::{ModelContract, Validator, nullable_string};
pub use error::{ModelError, Result};
pub use registry::{ModelDefinition, PageModel, TransformFn, register_core_models};
