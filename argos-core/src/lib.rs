#![deny(warnings)]
#![deny(rust_2018_idioms)]

mod domain;
pub mod error;
mod geo;
mod ports;

pub use domain::*;
pub use error::*;
pub use geo::*;
pub use ports::*;
