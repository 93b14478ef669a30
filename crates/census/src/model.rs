use serde::{Deserialize, Serialize};

use crate::error::CensusError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One equipment row as the registry sees it at reconciliation time.
///
/// Equipment without a tag takes no part in a census: it can neither go
/// missing nor match a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentTag {
    pub equipo_id: String,
    #[serde(default)]
    pub rfid_tag_id: Option<String>,
}

impl EquipmentTag {
    pub fn tagged(equipo_id: impl Into<String>, rfid_tag_id: impl Into<String>) -> Self {
        Self {
            equipo_id: equipo_id.into(),
            rfid_tag_id: Some(rfid_tag_id.into()),
        }
    }

    pub fn untagged(equipo_id: impl Into<String>) -> Self {
        Self {
            equipo_id: equipo_id.into(),
            rfid_tag_id: None,
        }
    }

    /// The registered tag, if any. Blank strings count as unset.
    pub fn tag(&self) -> Option<&str> {
        self.rfid_tag_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Organization-wide tag index row: which equipment carries a tag and where
/// that equipment is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredTag {
    pub rfid_tag_id: String,
    pub equipo_id: String,
    pub ubicacion_id: String,
}

// ---------------------------------------------------------------------------
// Discrepancies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum Discrepancy {
    /// Registered equipment whose tag was not read.
    #[serde(rename = "FALTANTE", rename_all = "camelCase")]
    Faltante { equipo_id: String },
    /// Read tag that no equipment is registered with.
    #[serde(rename = "NO_REGISTRADO", rename_all = "camelCase")]
    NoRegistrado { rfid_tag_id: String },
}

impl Discrepancy {
    pub fn faltante(equipo_id: impl Into<String>) -> Self {
        Self::Faltante {
            equipo_id: equipo_id.into(),
        }
    }

    pub fn no_registrado(rfid_tag_id: impl Into<String>) -> Self {
        Self::NoRegistrado {
            rfid_tag_id: rfid_tag_id.into(),
        }
    }

    pub fn kind(&self) -> DiscrepancyKind {
        match self {
            Self::Faltante { .. } => DiscrepancyKind::Faltante,
            Self::NoRegistrado { .. } => DiscrepancyKind::NoRegistrado,
        }
    }

    /// Equipment id for FALTANTE, tag id for NO_REGISTRADO.
    pub fn subject(&self) -> &str {
        match self {
            Self::Faltante { equipo_id } => equipo_id,
            Self::NoRegistrado { rfid_tag_id } => rfid_tag_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscrepancyKind {
    Faltante,
    NoRegistrado,
}

impl DiscrepancyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faltante => "FALTANTE",
            Self::NoRegistrado => "NO_REGISTRADO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FALTANTE" => Some(Self::Faltante),
            "NO_REGISTRADO" => Some(Self::NoRegistrado),
            _ => None,
        }
    }
}

impl std::fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scanned tag that belongs to equipment registered at another location.
/// Informational only; never counted as a discrepancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MisplacedTag {
    pub rfid_tag_id: String,
    pub equipo_id: String,
    /// Location the equipment is registered at.
    pub ubicacion_id: String,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Result of one census. Counts are derived from `discrepancias` on
/// construction and cannot drift from it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawReport")]
pub struct DiscrepancyReport {
    discrepancias: Vec<Discrepancy>,
    faltantes_count: usize,
    no_registrados_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fuera_de_ubicacion: Vec<MisplacedTag>,
}

impl DiscrepancyReport {
    pub fn new(discrepancias: Vec<Discrepancy>, fuera_de_ubicacion: Vec<MisplacedTag>) -> Self {
        let faltantes_count = discrepancias
            .iter()
            .filter(|d| d.kind() == DiscrepancyKind::Faltante)
            .count();
        let no_registrados_count = discrepancias.len() - faltantes_count;
        Self {
            discrepancias,
            faltantes_count,
            no_registrados_count,
            fuera_de_ubicacion,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn discrepancias(&self) -> &[Discrepancy] {
        &self.discrepancias
    }

    pub fn faltantes_count(&self) -> usize {
        self.faltantes_count
    }

    pub fn no_registrados_count(&self) -> usize {
        self.no_registrados_count
    }

    pub fn fuera_de_ubicacion(&self) -> &[MisplacedTag] {
        &self.fuera_de_ubicacion
    }

    /// Equipment ids reported missing, in report order.
    pub fn faltantes(&self) -> impl Iterator<Item = &str> {
        self.discrepancias.iter().filter_map(|d| match d {
            Discrepancy::Faltante { equipo_id } => Some(equipo_id.as_str()),
            Discrepancy::NoRegistrado { .. } => None,
        })
    }

    /// Tags reported unregistered, in report order.
    pub fn no_registrados(&self) -> impl Iterator<Item = &str> {
        self.discrepancias.iter().filter_map(|d| match d {
            Discrepancy::NoRegistrado { rfid_tag_id } => Some(rfid_tag_id.as_str()),
            Discrepancy::Faltante { .. } => None,
        })
    }

    /// True when the scan matched the registry exactly.
    pub fn is_clean(&self) -> bool {
        self.discrepancias.is_empty()
    }
}

/// Wire form accepted on deserialization; counts are checked against the list.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReport {
    discrepancias: Vec<Discrepancy>,
    faltantes_count: usize,
    no_registrados_count: usize,
    #[serde(default)]
    fuera_de_ubicacion: Vec<MisplacedTag>,
}

impl TryFrom<RawReport> for DiscrepancyReport {
    type Error = CensusError;

    fn try_from(raw: RawReport) -> Result<Self, Self::Error> {
        let report = DiscrepancyReport::new(raw.discrepancias, raw.fuera_de_ubicacion);
        if report.faltantes_count != raw.faltantes_count
            || report.no_registrados_count != raw.no_registrados_count
        {
            return Err(CensusError::invalid(format!(
                "report counts ({}, {}) do not match discrepancies ({}, {})",
                raw.faltantes_count,
                raw.no_registrados_count,
                report.faltantes_count,
                report.no_registrados_count,
            )));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_discrepancies() {
        let report = DiscrepancyReport::new(
            vec![
                Discrepancy::faltante("E1"),
                Discrepancy::faltante("E2"),
                Discrepancy::no_registrado("ZZZ"),
            ],
            vec![],
        );
        assert_eq!(report.faltantes_count(), 2);
        assert_eq!(report.no_registrados_count(), 1);
        assert_eq!(report.faltantes().collect::<Vec<_>>(), vec!["E1", "E2"]);
        assert_eq!(report.no_registrados().collect::<Vec<_>>(), vec!["ZZZ"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn wire_shape() {
        let report = DiscrepancyReport::new(
            vec![Discrepancy::faltante("E2"), Discrepancy::no_registrado("ZZZ")],
            vec![],
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "discrepancias": [
                    { "tipo": "FALTANTE", "equipoId": "E2" },
                    { "tipo": "NO_REGISTRADO", "rfidTagId": "ZZZ" }
                ],
                "faltantesCount": 1,
                "noRegistradosCount": 1
            })
        );
    }

    #[test]
    fn misplaced_serialized_when_present() {
        let report = DiscrepancyReport::new(
            vec![],
            vec![MisplacedTag {
                rfid_tag_id: "CCC".into(),
                equipo_id: "E9".into(),
                ubicacion_id: "L2".into(),
            }],
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["fueraDeUbicacion"][0]["ubicacionId"], "L2");
        assert_eq!(value["faltantesCount"], 0);
    }

    #[test]
    fn deserialize_rejects_inconsistent_counts() {
        let json = r#"{
            "discrepancias": [{ "tipo": "FALTANTE", "equipoId": "E1" }],
            "faltantesCount": 0,
            "noRegistradosCount": 1
        }"#;
        assert!(serde_json::from_str::<DiscrepancyReport>(json).is_err());
    }

    #[test]
    fn deserialize_accepts_consistent_counts() {
        let json = r#"{
            "discrepancias": [{ "tipo": "NO_REGISTRADO", "rfidTagId": "ZZZ" }],
            "faltantesCount": 0,
            "noRegistradosCount": 1
        }"#;
        let report: DiscrepancyReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.discrepancias(), &[Discrepancy::no_registrado("ZZZ")]);
    }

    #[test]
    fn blank_tag_is_unset() {
        assert_eq!(EquipmentTag::tagged("E1", "  ").tag(), None);
        assert_eq!(EquipmentTag::untagged("E1").tag(), None);
        assert_eq!(EquipmentTag::tagged("E1", " AAA ").tag(), Some("AAA"));
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [DiscrepancyKind::Faltante, DiscrepancyKind::NoRegistrado] {
            assert_eq!(DiscrepancyKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DiscrepancyKind::parse("MISSING"), None);
    }
}
