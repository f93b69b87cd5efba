mod ais;
mod alert;
mod vessel;

pub use ais::*;
pub use alert::*;
pub use vessel::*;
