#[macro_use]
extern crate pest_derive;

pub mod config;
pub mod error;
pub mod executor;
pub mod lang;
pub mod query;
pub mod session;
pub mod traversal;

#[cfg(test)]
mod tests;

pub use error::{Result, WashError};
pub use executor::{ScriptResult, Wash};
pub use query::Query;
pub use traversal::value::{ResultNode, ResultValue};
