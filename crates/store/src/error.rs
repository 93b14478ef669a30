use plantnet_census::CensusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Census(#[from] CensusError),
    #[error("unknown location '{0}'")]
    UnknownLocation(String),
    #[error("unknown location type '{0}'")]
    UnknownLocationKind(String),
    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: &'static str, id: String },
    #[error("rfid tag '{tag}' already assigned to equipment '{equipo_id}'")]
    TagInUse { tag: String, equipo_id: String },
    #[error("corrupt census row: {0}")]
    Corrupt(String),
}

impl From<StoreError> for CensusError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Census(inner) => inner,
            domain @ (StoreError::UnknownLocation(_)
            | StoreError::UnknownLocationKind(_)
            | StoreError::Duplicate { .. }
            | StoreError::TagInUse { .. }) => CensusError::InvalidArgument(domain.to_string()),
            other @ (StoreError::Sqlite(_) | StoreError::Corrupt(_)) => {
                CensusError::Store(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_become_invalid_arguments() {
        let err = CensusError::from(StoreError::UnknownLocation("IDF-9".into()));
        match err {
            CensusError::InvalidArgument(msg) => assert!(msg.contains("IDF-9")),
            other => panic!("unexpected error: {other:?}"),
        }
        let err = CensusError::from(StoreError::TagInUse { tag: "AAA".into(), equipo_id: "E1".into() });
        assert!(matches!(err, CensusError::InvalidArgument(_)));
        let err = CensusError::from(StoreError::Duplicate { kind: "equipment", id: "E1".into() });
        assert!(matches!(err, CensusError::InvalidArgument(_)));
    }

    #[test]
    fn database_failures_stay_store_errors() {
        let err = CensusError::from(StoreError::Corrupt("counts".into()));
        assert!(matches!(err, CensusError::Store(_)));
        let err = CensusError::from(StoreError::Census(CensusError::NotCensusLocation {
            location: "P1".into(),
        }));
        assert!(matches!(err, CensusError::NotCensusLocation { .. }));
    }
}
