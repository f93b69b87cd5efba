#![deny(warnings)]
#![deny(rust_2018_idioms)]

pub mod cpa;
pub mod detector;
pub mod error;
pub mod models;
pub mod settings;

pub use cpa::*;
pub use detector::*;
pub use error::*;
pub use models::*;
pub use settings::*;
