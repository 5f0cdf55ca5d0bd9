/// Core errors.
///
/// Most bad input in this crate degrades silently per the UI contract
/// (an unparseable day string simply leaves the previous state in place),
/// so this taxonomy only covers the boundaries where a caller can
/// meaningfully react.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid iso day: {0}")]
    InvalidDay(String),

    #[error("generic error: {0}")]
    Generic(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}
