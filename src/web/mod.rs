//! HTTP front end for the analyst.
//!
//! Only built with the `server` feature.

mod server;

pub use server::*;
