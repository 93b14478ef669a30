//! Census request as it arrives from a handheld export or an API client.

use serde::Serialize;
use serde_json::Value;

use crate::error::CensusError;
use crate::normalize::{clean_tags, split_raw_tags};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CensusRequest {
    pub ubicacion_id: String,
    /// Tags as read, trimmed, duplicates kept.
    pub rfid_tags_leidos: Vec<String>,
}

impl CensusRequest {
    pub fn new<S: AsRef<str>>(ubicacion_id: impl Into<String>, tags: &[S]) -> Self {
        Self {
            ubicacion_id: ubicacion_id.into().trim().to_string(),
            rfid_tags_leidos: clean_tags(tags),
        }
    }

    /// Build from raw reader output (newline, comma or space separated).
    pub fn from_raw(ubicacion_id: impl Into<String>, raw: &str) -> Self {
        Self::new(ubicacion_id, &split_raw_tags(raw))
    }

    /// Parse `{ "ubicacionId": "...", "rfidTagsLeidos": [...] }`.
    ///
    /// `rfidTagsLeidos` may also be a single string of raw reader output.
    pub fn from_json(input: &str) -> Result<Self, CensusError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| CensusError::invalid(format!("request is not valid JSON: {e}")))?;
        let obj = value
            .as_object()
            .ok_or_else(|| CensusError::invalid("request must be a JSON object"))?;

        let ubicacion_id = match obj.get("ubicacionId") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(CensusError::invalid("ubicacionId must be a string")),
            None => return Err(CensusError::invalid("ubicacionId is required")),
        };

        let request = match obj.get("rfidTagsLeidos") {
            Some(Value::Array(items)) => {
                let tags = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        v.as_str().ok_or_else(|| {
                            CensusError::invalid(format!("rfidTagsLeidos[{i}] must be a string"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::new(ubicacion_id, &tags)
            }
            Some(Value::String(raw)) => Self::from_raw(ubicacion_id, raw),
            Some(_) => {
                return Err(CensusError::invalid(
                    "rfidTagsLeidos must be an array of strings",
                ))
            }
            None => return Err(CensusError::invalid("rfidTagsLeidos is required")),
        };

        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), CensusError> {
        if self.ubicacion_id.is_empty() {
            return Err(CensusError::invalid("ubicacionId must not be empty"));
        }
        Ok(())
    }
}
