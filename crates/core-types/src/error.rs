use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown strategy identifier: '{0}'")]
    UnknownStrategy(String),
}
