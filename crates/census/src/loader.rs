//! Equipment CSV loading.
//!
//! Columns: `equipo_id`, `ubicacion_id`, `rfid_tag_id` (required headers),
//! `nombre` (optional). An empty `rfid_tag_id` cell means untagged.
//! Equipment ids and tags are unique within a file, as they are in the store.

use std::collections::HashMap;

use crate::error::CensusError;
use crate::model::{EquipmentTag, RegisteredTag};

/// One row of an equipment CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentRow {
    pub equipo_id: String,
    pub nombre: Option<String>,
    pub ubicacion_id: String,
    pub rfid_tag_id: Option<String>,
}

pub fn load_equipment_csv(csv_data: &str) -> Result<Vec<EquipmentRow>, CensusError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CensusError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, CensusError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CensusError::MissingColumn { column: name.into() })
    };

    let equipo_idx = idx("equipo_id")?;
    let ubicacion_idx = idx("ubicacion_id")?;
    let tag_idx = idx("rfid_tag_id")?;
    let nombre_idx = headers.iter().position(|h| h == "nombre");

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    let mut rows = Vec::new();
    let mut id_lines: HashMap<String, usize> = HashMap::new();
    let mut tag_lines: HashMap<String, (usize, String)> = HashMap::new();

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| CensusError::Csv(e.to_string()))?;
        // +2: header line, 1-based numbering
        let line = i + 2;

        let equipo_id = record.get(equipo_idx).unwrap_or("");
        if equipo_id.is_empty() {
            return Err(CensusError::Csv(format!("line {line}: empty equipo_id")));
        }
        if let Some(first) = id_lines.insert(equipo_id.to_string(), line) {
            return Err(CensusError::Csv(format!(
                "line {line}: equipo_id '{equipo_id}' already listed on line {first}"
            )));
        }

        let rfid_tag_id = record.get(tag_idx).and_then(non_empty);
        if let Some(ref tag) = rfid_tag_id {
            if let Some((first, holder)) = tag_lines.get(tag) {
                return Err(CensusError::Csv(format!(
                    "line {line}: rfid_tag_id '{tag}' already assigned to '{holder}' on line {first}"
                )));
            }
            tag_lines.insert(tag.clone(), (line, equipo_id.to_string()));
        }

        rows.push(EquipmentRow {
            equipo_id: equipo_id.to_string(),
            nombre: nombre_idx.and_then(|i| record.get(i)).and_then(non_empty),
            ubicacion_id: record.get(ubicacion_idx).unwrap_or("").to_string(),
            rfid_tag_id,
        });
    }

    Ok(rows)
}

/// Split loaded rows into the equipment expected at `location` and the
/// organization-wide tag index.
pub fn split_for_location(
    rows: &[EquipmentRow],
    location: &str,
) -> (Vec<EquipmentTag>, Vec<RegisteredTag>) {
    let expected = rows
        .iter()
        .filter(|r| r.ubicacion_id == location)
        .map(|r| EquipmentTag {
            equipo_id: r.equipo_id.clone(),
            rfid_tag_id: r.rfid_tag_id.clone(),
        })
        .collect();

    let index = rows
        .iter()
        .filter_map(|r| {
            r.rfid_tag_id.as_ref().map(|tag| RegisteredTag {
                rfid_tag_id: tag.clone(),
                equipo_id: r.equipo_id.clone(),
                ubicacion_id: r.ubicacion_id.clone(),
            })
        })
        .collect();

    (expected, index)
}
