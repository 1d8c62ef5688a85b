//! Browse and export posts from the posts service: filters, a page cursor, and listing requests
//! where only the newest response is applied.

pub mod client;
pub mod config;
pub mod export;
pub mod metrics;
pub mod query;
pub mod twoface;
pub mod view;

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[cfg(test)]
#[macro_use]
extern crate guard;
