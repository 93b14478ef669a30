use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CensusError;
use crate::model::DiscrepancyReport;

/// A census ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewCensus {
    pub ubicacion_id: String,
    pub organization_id: String,
    pub performed_by: String,
    /// Tags as read, duplicates included.
    pub rfid_tags_leidos: Vec<String>,
    pub report: DiscrepancyReport,
}

/// A persisted census with its tag list and report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CensusRecord {
    pub id: String,
    pub ubicacion_id: String,
    pub organization_id: String,
    pub performed_by: String,
    pub created_at: DateTime<Utc>,
    pub rfid_tags_leidos: Vec<String>,
    pub report: DiscrepancyReport,
}

/// Audit trail of census events.
///
/// `record_census` must be atomic: a header is never visible without its tag
/// list and report, nor the other way round.
pub trait CensusHistory {
    fn record_census(&self, census: NewCensus) -> Result<String, CensusError>;

    /// Newest first, optionally restricted to one location.
    fn list_censuses(
        &self,
        organization_id: &str,
        location: Option<&str>,
    ) -> Result<Vec<CensusRecord>, CensusError>;

    fn get_census(&self, organization_id: &str, id: &str)
        -> Result<Option<CensusRecord>, CensusError>;

    /// Returns false when no census with that id exists in the organization.
    fn delete_census(&self, organization_id: &str, id: &str) -> Result<bool, CensusError>;
}

impl<T: CensusHistory + ?Sized> CensusHistory for &T {
    fn record_census(&self, census: NewCensus) -> Result<String, CensusError> {
        (**self).record_census(census)
    }

    fn list_censuses(
        &self,
        organization_id: &str,
        location: Option<&str>,
    ) -> Result<Vec<CensusRecord>, CensusError> {
        (**self).list_censuses(organization_id, location)
    }

    fn get_census(
        &self,
        organization_id: &str,
        id: &str,
    ) -> Result<Option<CensusRecord>, CensusError> {
        (**self).get_census(organization_id, id)
    }

    fn delete_census(&self, organization_id: &str, id: &str) -> Result<bool, CensusError> {
        (**self).delete_census(organization_id, id)
    }
}
