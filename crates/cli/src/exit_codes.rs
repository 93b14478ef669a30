//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract: scheduled census jobs branch on
//! them, so every code the binary can return is defined here.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success; for a census, no discrepancies             |
//! | 1    | General error (census not found, unreadable file)   |
//! | 2    | Usage error (bad arguments, missing org, bad policy)|
//! | 3    | Census completed and found discrepancies            |
//! | 4    | Invalid census or inventory input                   |
//! | 5    | Store error (database unreadable, corrupt rows)     |

use plantnet_census::CensusError;
use plantnet_store::StoreError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// The census ran (and was recorded unless `--dry-run`) but the report has
/// FALTANTE or NO_REGISTRADO entries.
pub const EXIT_CENSUS_DISCREPANCIES: u8 = 3;

/// The request or inventory data was rejected: empty location id, location
/// that is not an IDF/MDF, malformed CSV, duplicate ids.
pub const EXIT_INVALID_INPUT: u8 = 4;

/// The database failed underneath us.
pub const EXIT_STORE: u8 = 5;

/// Map a census error to its exit code.
pub fn census_exit_code(err: &CensusError) -> u8 {
    match err {
        CensusError::InvalidArgument(_)
        | CensusError::NotCensusLocation { .. }
        | CensusError::MissingColumn { .. }
        | CensusError::Csv(_) => EXIT_INVALID_INPUT,
        CensusError::PolicyParse(_) => EXIT_USAGE,
        CensusError::Store(_) => EXIT_STORE,
    }
}

/// Map a store error to its exit code.
pub fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::Census(inner) => census_exit_code(inner),
        StoreError::UnknownLocation(_)
        | StoreError::UnknownLocationKind(_)
        | StoreError::Duplicate { .. }
        | StoreError::TagInUse { .. } => EXIT_INVALID_INPUT,
        StoreError::Sqlite(_) | StoreError::Corrupt(_) => EXIT_STORE,
    }
}
