use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum GenerateError {
    /// The curve asset a path container needs is not in the catalog.
    MissingCurveAsset(String),
    Io(std::io::Error),
}

impl Display for GenerateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCurveAsset(key) => {
                write!(f, "curve asset `{key}` is missing from the asset catalog")
            }
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<std::io::Error> for GenerateError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
