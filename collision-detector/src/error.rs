use snafu::{IntoError, Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Domain error"))]
    Core {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: argos_core::Error,
    },
}

impl From<argos_core::Error> for Error {
    fn from(error: argos_core::Error) -> Self {
        error::CoreSnafu.into_error(error)
    }
}
