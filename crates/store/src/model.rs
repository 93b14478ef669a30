use std::str::FromStr;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Planta,
    Edificio,
    /// Intermediate distribution frame.
    Idf,
    /// Main distribution frame.
    Mdf,
    Rack,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planta => "Planta",
            Self::Edificio => "Edificio",
            Self::Idf => "IDF",
            Self::Mdf => "MDF",
            Self::Rack => "Rack",
        }
    }

    /// Only telecom closets are censused.
    pub fn is_census_target(&self) -> bool {
        matches!(self, Self::Idf | Self::Mdf)
    }
}

impl FromStr for LocationKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planta" => Ok(Self::Planta),
            "edificio" => Ok(Self::Edificio),
            "idf" => Ok(Self::Idf),
            "mdf" => Ok(Self::Mdf),
            "rack" => Ok(Self::Rack),
            _ => Err(StoreError::UnknownLocationKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: String,
    pub nombre: String,
    pub tipo: LocationKind,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    pub id: String,
    pub nombre: String,
    pub ubicacion_id: String,
    pub rfid_tag_id: Option<String>,
}
