//! Census orchestration: validate, fetch, reconcile, record.

use serde::Serialize;

use crate::config::CensusPolicy;
use crate::engine::reconcile;
use crate::error::CensusError;
use crate::history::{CensusHistory, NewCensus};
use crate::model::DiscrepancyReport;
use crate::registry::EquipmentRegistry;
use crate::request::CensusRequest;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CensusOutcome {
    /// None for a dry run.
    pub census_id: Option<String>,
    pub ubicacion_id: String,
    pub rfid_tags_leidos: Vec<String>,
    pub report: DiscrepancyReport,
}

pub struct CensusService<R, H> {
    registry: R,
    history: H,
    policy: CensusPolicy,
}

impl<R: EquipmentRegistry, H: CensusHistory> CensusService<R, H> {
    pub fn new(registry: R, history: H, policy: CensusPolicy) -> Self {
        Self {
            registry,
            history,
            policy,
        }
    }

    pub fn policy(&self) -> &CensusPolicy {
        &self.policy
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Reconcile without recording anything.
    pub fn preview(
        &self,
        organization_id: &str,
        request: &CensusRequest,
    ) -> Result<DiscrepancyReport, CensusError> {
        request.validate()?;
        let location = request.ubicacion_id.as_str();

        if !self.registry.is_census_location(organization_id, location)? {
            return Err(CensusError::NotCensusLocation {
                location: location.to_string(),
            });
        }

        let expected = self
            .registry
            .equipment_with_tags_for_location(organization_id, location)?;
        let org_index = if self.policy.needs_organization_index() {
            self.registry.registered_tags_for_organization(organization_id)?
        } else {
            Vec::new()
        };

        reconcile(
            location,
            &expected,
            &request.rfid_tags_leidos,
            &org_index,
            &self.policy,
        )
    }

    /// Reconcile and record the census with its tag list in one write.
    pub fn run_census(
        &self,
        organization_id: &str,
        performed_by: &str,
        request: CensusRequest,
    ) -> Result<CensusOutcome, CensusError> {
        let report = self.preview(organization_id, &request)?;

        let census_id = self.history.record_census(NewCensus {
            ubicacion_id: request.ubicacion_id.clone(),
            organization_id: organization_id.to_string(),
            performed_by: performed_by.to_string(),
            rfid_tags_leidos: request.rfid_tags_leidos.clone(),
            report: report.clone(),
        })?;

        log::info!(
            "census {census_id} recorded for {} by {performed_by}: {} faltantes, {} no registrados",
            request.ubicacion_id,
            report.faltantes_count(),
            report.no_registrados_count(),
        );

        Ok(CensusOutcome {
            census_id: Some(census_id),
            ubicacion_id: request.ubicacion_id,
            rfid_tags_leidos: request.rfid_tags_leidos,
            report,
        })
    }

    /// Same as [`run_census`](Self::run_census) without the write.
    pub fn dry_run(
        &self,
        organization_id: &str,
        request: CensusRequest,
    ) -> Result<CensusOutcome, CensusError> {
        let report = self.preview(organization_id, &request)?;
        Ok(CensusOutcome {
            census_id: None,
            ubicacion_id: request.ubicacion_id,
            rfid_tags_leidos: request.rfid_tags_leidos,
            report,
        })
    }
}
