use thiserror::Error;

#[derive(Debug, Error)]
pub enum CensusError {
    /// Input the reconciler cannot work with (empty location, malformed request).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Location is unknown to the organization, or is not an IDF/MDF closet.
    #[error("location '{location}' is not a census location for this organization")]
    NotCensusLocation { location: String },
    /// Policy TOML parse / deserialization error.
    #[error("policy parse error: {0}")]
    PolicyParse(String),
    /// Missing required column in an equipment CSV.
    #[error("equipment CSV: missing column '{column}'")]
    MissingColumn { column: String },
    /// CSV read error.
    #[error("equipment CSV: {0}")]
    Csv(String),
    /// Registry or history collaborator failed.
    #[error("store error: {0}")]
    Store(String),
}

impl CensusError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
