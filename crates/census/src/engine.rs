use std::collections::{HashMap, HashSet};

use crate::config::{CensusPolicy, TagCase, UnregisteredScope};
use crate::error::CensusError;
use crate::model::{Discrepancy, DiscrepancyReport, EquipmentTag, MisplacedTag, RegisteredTag};
use crate::normalize::normalize_scan;

/// Tagged equipment at one location, indexed by tag.
struct LocationLookup<'a> {
    /// Tagged equipment ids in first-seen order.
    equipment: Vec<&'a str>,
    /// Tag -> equipment carrying it. More than one entry means the registry
    /// holds a duplicate tag.
    by_tag: HashMap<String, Vec<&'a str>>,
}

fn build_location_lookup<'a>(
    location_id: &str,
    expected: &'a [EquipmentTag],
    case: TagCase,
) -> LocationLookup<'a> {
    let mut equipment = Vec::new();
    let mut by_tag: HashMap<String, Vec<&'a str>> = HashMap::new();
    let mut listed: HashSet<&str> = HashSet::new();

    for eq in expected {
        let Some(tag) = eq.tag() else { continue };
        if !listed.insert(eq.equipo_id.as_str()) {
            log::warn!(
                "census {location_id}: equipment '{}' listed twice, keeping first tag",
                eq.equipo_id
            );
            continue;
        }
        equipment.push(eq.equipo_id.as_str());
        let holders = by_tag.entry(case.apply(tag)).or_default();
        if !holders.is_empty() {
            log::warn!(
                "census {location_id}: tag '{tag}' registered to both '{}' and '{}'",
                holders[0],
                eq.equipo_id
            );
        }
        holders.push(eq.equipo_id.as_str());
    }

    LocationLookup { equipment, by_tag }
}

fn build_organization_lookup<'a>(
    org_index: &'a [RegisteredTag],
    case: TagCase,
) -> HashMap<String, &'a RegisteredTag> {
    let mut lookup = HashMap::with_capacity(org_index.len());
    for reg in org_index {
        let tag = reg.rfid_tag_id.trim();
        if tag.is_empty() {
            continue;
        }
        lookup.entry(case.apply(tag)).or_insert(reg);
    }
    lookup
}

/// Compare the tags read at a location against the equipment registered there.
///
/// Output order is fixed: every FALTANTE (in `expected` order) followed by
/// every NO_REGISTRADO (in first-read order). Repeated reads of a tag count
/// once. `org_index` is only consulted under
/// [`UnregisteredScope::Organization`]; tags it knows that belong to another
/// location go to the report's misplaced list rather than NO_REGISTRADO.
pub fn reconcile<S: AsRef<str>>(
    location_id: &str,
    expected: &[EquipmentTag],
    scanned: &[S],
    org_index: &[RegisteredTag],
    policy: &CensusPolicy,
) -> Result<DiscrepancyReport, CensusError> {
    let location_id = location_id.trim();
    if location_id.is_empty() {
        return Err(CensusError::invalid("location id must not be empty"));
    }

    let lookup = build_location_lookup(location_id, expected, policy.tag_case);
    let org_lookup = match policy.unregistered_scope {
        UnregisteredScope::Organization => build_organization_lookup(org_index, policy.tag_case),
        UnregisteredScope::Location => HashMap::new(),
    };
    let scan = normalize_scan(scanned, policy.tag_case);

    log::debug!(
        "census {location_id}: {} tagged equipment expected, {} reads ({} distinct), scope={}",
        lookup.equipment.len(),
        scanned.len(),
        scan.len(),
        policy.unregistered_scope,
    );

    let mut seen: HashSet<&str> = HashSet::new();
    let mut unregistered = Vec::new();
    let mut misplaced = Vec::new();

    for tag in scan {
        if let Some(holders) = lookup.by_tag.get(&tag) {
            seen.extend(holders.iter().copied());
            continue;
        }
        if let Some(reg) = org_lookup.get(&tag) {
            if reg.ubicacion_id != location_id {
                misplaced.push(MisplacedTag {
                    rfid_tag_id: tag,
                    equipo_id: reg.equipo_id.clone(),
                    ubicacion_id: reg.ubicacion_id.clone(),
                });
                continue;
            }
            // Indexed here but not among the expected equipment.
            log::warn!(
                "census {location_id}: tag '{tag}' indexed for '{}' here but not expected; reporting it unregistered",
                reg.equipo_id
            );
        }
        unregistered.push(Discrepancy::no_registrado(tag));
    }

    let mut discrepancias: Vec<Discrepancy> = lookup
        .equipment
        .iter()
        .filter(|id| !seen.contains(*id))
        .map(|id| Discrepancy::faltante(*id))
        .collect();
    discrepancias.extend(unregistered);

    let report = DiscrepancyReport::new(discrepancias, misplaced);
    log::debug!(
        "census {location_id}: {} faltantes, {} no registrados, {} fuera de ubicacion",
        report.faltantes_count(),
        report.no_registrados_count(),
        report.fuera_de_ubicacion().len(),
    );
    Ok(report)
}
