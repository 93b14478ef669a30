use crate::error::CensusError;
use crate::model::{EquipmentTag, RegisteredTag};

/// Read side of the inventory: what equipment is registered where.
///
/// Every call is scoped to one organization by the caller. Implementations
/// return an empty list, not an error, for a location with no equipment.
pub trait EquipmentRegistry {
    /// Equipment registered at `location`, tagged or not.
    fn equipment_with_tags_for_location(
        &self,
        organization_id: &str,
        location: &str,
    ) -> Result<Vec<EquipmentTag>, CensusError>;

    /// Every tagged piece of equipment in the organization.
    fn registered_tags_for_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<RegisteredTag>, CensusError>;

    /// True when `location` belongs to the organization and is an IDF/MDF closet.
    fn is_census_location(&self, organization_id: &str, location: &str)
        -> Result<bool, CensusError>;
}

impl<T: EquipmentRegistry + ?Sized> EquipmentRegistry for &T {
    fn equipment_with_tags_for_location(
        &self,
        organization_id: &str,
        location: &str,
    ) -> Result<Vec<EquipmentTag>, CensusError> {
        (**self).equipment_with_tags_for_location(organization_id, location)
    }

    fn registered_tags_for_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<RegisteredTag>, CensusError> {
        (**self).registered_tags_for_organization(organization_id)
    }

    fn is_census_location(
        &self,
        organization_id: &str,
        location: &str,
    ) -> Result<bool, CensusError> {
        (**self).is_census_location(organization_id, location)
    }
}
