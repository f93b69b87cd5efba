#![deny(warnings)]
#![deny(rust_2018_idioms)]

pub mod behavior;
pub mod engine;
pub mod error;
pub mod scenario;
pub mod settings;
pub mod vessel;

pub use behavior::*;
pub use engine::*;
pub use error::*;
pub use scenario::*;
pub use settings::*;
pub use vessel::*;
