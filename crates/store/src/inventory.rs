// Locations and equipment: seeding plus the read side used by a census.

use std::path::Path;

use plantnet_census::loader::load_equipment_csv;
use plantnet_census::{CensusError, EquipmentRegistry, EquipmentTag, RegisteredTag};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::model::{Equipment, Location, LocationKind};
use crate::schema::SCHEMA;

/// SQLite-backed inventory and census history for any number of organizations.
pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn ensure_organization(&self, organization_id: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO organizations (id, name) VALUES (?1, ?1)",
            params![organization_id],
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Locations
    // -----------------------------------------------------------------------

    pub fn add_location(&self, organization_id: &str, location: &Location) -> Result<(), StoreError> {
        self.ensure_organization(organization_id)?;

        if self.location_exists(&location.id)? {
            return Err(StoreError::Duplicate { kind: "location", id: location.id.clone() });
        }
        if let Some(ref parent) = location.parent_id {
            if self.location(organization_id, parent)?.is_none() {
                return Err(StoreError::UnknownLocation(parent.clone()));
            }
        }

        self.conn.execute(
            "INSERT INTO ubicaciones (id, nombre, tipo, parent_id, organization_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                location.id,
                location.nombre,
                location.tipo.as_str(),
                location.parent_id,
                organization_id,
            ],
        )?;
        log::debug!("added location {} ({}) to {organization_id}", location.id, location.tipo);
        Ok(())
    }

    pub fn location(&self, organization_id: &str, id: &str) -> Result<Option<Location>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, nombre, tipo, parent_id FROM ubicaciones
                 WHERE id = ?1 AND organization_id = ?2",
                params![id, organization_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, nombre, tipo, parent_id)| -> Result<Location, StoreError> {
            Ok(Location { id, nombre, tipo: tipo.parse()?, parent_id })
        })
        .transpose()
    }

    /// Locations of the organization, ordered by name.
    pub fn list_locations(&self, organization_id: &str) -> Result<Vec<Location>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, nombre, tipo, parent_id FROM ubicaciones
             WHERE organization_id = ?1 ORDER BY nombre, id",
        )?;
        let rows = stmt.query_map(params![organization_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut locations = Vec::new();
        for row in rows {
            let (id, nombre, tipo, parent_id) = row?;
            locations.push(Location { id, nombre, tipo: tipo.parse()?, parent_id });
        }
        Ok(locations)
    }

    fn location_exists(&self, id: &str) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM ubicaciones WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    // -----------------------------------------------------------------------
    // Equipment
    // -----------------------------------------------------------------------

    pub fn add_equipment(&self, organization_id: &str, equipment: &Equipment) -> Result<(), StoreError> {
        insert_equipment(&self.conn, organization_id, equipment)
    }

    /// Import an equipment CSV (`equipo_id,nombre,ubicacion_id,rfid_tag_id`).
    /// All rows land or none do.
    pub fn import_equipment_csv(&self, organization_id: &str, csv_data: &str) -> Result<usize, StoreError> {
        let rows = load_equipment_csv(csv_data)?;

        let tx = self.conn.unchecked_transaction()?;
        for row in &rows {
            let equipment = Equipment {
                id: row.equipo_id.clone(),
                nombre: row.nombre.clone().unwrap_or_else(|| row.equipo_id.clone()),
                ubicacion_id: row.ubicacion_id.clone(),
                rfid_tag_id: row.rfid_tag_id.clone(),
            };
            insert_equipment(&tx, organization_id, &equipment)?;
        }
        tx.commit()?;

        log::info!("imported {} equipment rows into {organization_id}", rows.len());
        Ok(rows.len())
    }

    pub fn equipment_at(&self, organization_id: &str, location: &str) -> Result<Vec<Equipment>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, nombre, ubicacion_id, rfid_tag_id FROM equipos
             WHERE organization_id = ?1 AND ubicacion_id = ?2 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![organization_id, location], |row| {
            Ok(Equipment {
                id: row.get(0)?,
                nombre: row.get(1)?,
                ubicacion_id: row.get(2)?,
                rfid_tag_id: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn insert_equipment(conn: &Connection, organization_id: &str, equipment: &Equipment) -> Result<(), StoreError> {
    let in_org = conn
        .query_row(
            "SELECT 1 FROM ubicaciones WHERE id = ?1 AND organization_id = ?2",
            params![equipment.ubicacion_id, organization_id],
            |_| Ok(()),
        )
        .optional()?;
    if in_org.is_none() {
        return Err(StoreError::UnknownLocation(equipment.ubicacion_id.clone()));
    }

    let exists = conn
        .query_row("SELECT 1 FROM equipos WHERE id = ?1", params![equipment.id], |_| Ok(()))
        .optional()?;
    if exists.is_some() {
        return Err(StoreError::Duplicate { kind: "equipment", id: equipment.id.clone() });
    }

    let tag = equipment
        .rfid_tag_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(tag) = tag {
        let holder: Option<String> = conn
            .query_row(
                "SELECT id FROM equipos WHERE organization_id = ?1 AND rfid_tag_id = ?2",
                params![organization_id, tag],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(equipo_id) = holder {
            return Err(StoreError::TagInUse { tag: tag.to_string(), equipo_id });
        }
    }

    conn.execute(
        "INSERT INTO equipos (id, nombre, ubicacion_id, rfid_tag_id, organization_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![equipment.id, equipment.nombre, equipment.ubicacion_id, tag, organization_id],
    )?;
    Ok(())
}

impl EquipmentRegistry for SqliteStore {
    fn equipment_with_tags_for_location(
        &self,
        organization_id: &str,
        location: &str,
    ) -> Result<Vec<EquipmentTag>, CensusError> {
        let equipment = self.equipment_at(organization_id, location)?;
        Ok(equipment
            .into_iter()
            .map(|e| EquipmentTag { equipo_id: e.id, rfid_tag_id: e.rfid_tag_id })
            .collect())
    }

    fn registered_tags_for_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<RegisteredTag>, CensusError> {
        let query = || -> Result<Vec<RegisteredTag>, StoreError> {
            let mut stmt = self.conn.prepare(
                "SELECT rfid_tag_id, id, ubicacion_id FROM equipos
                 WHERE organization_id = ?1 AND rfid_tag_id IS NOT NULL ORDER BY rowid",
            )?;
            let rows = stmt.query_map(params![organization_id], |row| {
                Ok(RegisteredTag {
                    rfid_tag_id: row.get(0)?,
                    equipo_id: row.get(1)?,
                    ubicacion_id: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        };
        Ok(query()?)
    }

    fn is_census_location(&self, organization_id: &str, location: &str) -> Result<bool, CensusError> {
        let found = self.location(organization_id, location)?;
        Ok(found.is_some_and(|l| l.tipo.is_census_target()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closet(id: &str, tipo: LocationKind) -> Location {
        Location { id: id.into(), nombre: format!("Closet {id}"), tipo, parent_id: None }
    }

    fn equipment(id: &str, loc: &str, tag: Option<&str>) -> Equipment {
        Equipment {
            id: id.into(),
            nombre: format!("Switch {id}"),
            ubicacion_id: loc.into(),
            rfid_tag_id: tag.map(String::from),
        }
    }

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add_location("org1", &closet("P1", LocationKind::Planta)).unwrap();
        store.add_location("org1", &closet("IDF-1", LocationKind::Idf)).unwrap();
        store.add_equipment("org1", &equipment("E1", "IDF-1", Some("AAA"))).unwrap();
        store.add_equipment("org1", &equipment("E2", "IDF-1", None)).unwrap();
        store
    }

    #[test]
    fn census_location_requires_closet_in_org() {
        let store = seeded();
        assert!(store.is_census_location("org1", "IDF-1").unwrap());
        assert!(!store.is_census_location("org1", "P1").unwrap());
        assert!(!store.is_census_location("org2", "IDF-1").unwrap());
        assert!(!store.is_census_location("org1", "nowhere").unwrap());
    }

    #[test]
    fn expected_equipment_includes_untagged() {
        let store = seeded();
        let expected = store.equipment_with_tags_for_location("org1", "IDF-1").unwrap();
        assert_eq!(
            expected,
            vec![EquipmentTag::tagged("E1", "AAA"), EquipmentTag::untagged("E2")]
        );
        assert!(store.equipment_with_tags_for_location("org2", "IDF-1").unwrap().is_empty());
    }

    #[test]
    fn empty_location_is_not_an_error() {
        let store = seeded();
        assert!(store.equipment_with_tags_for_location("org1", "P1").unwrap().is_empty());
    }

    #[test]
    fn duplicate_tag_rejected() {
        let store = seeded();
        let err = store
            .add_equipment("org1", &equipment("E3", "IDF-1", Some("AAA")))
            .unwrap_err();
        assert!(matches!(err, StoreError::TagInUse { .. }));
    }

    #[test]
    fn equipment_needs_location_in_org() {
        let store = seeded();
        store.add_location("org2", &closet("IDF-9", LocationKind::Idf)).unwrap();
        let err = store
            .add_equipment("org1", &equipment("E9", "IDF-9", None))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownLocation(_)));
    }

    #[test]
    fn import_is_all_or_nothing() {
        let store = seeded();
        let csv = "equipo_id,nombre,ubicacion_id,rfid_tag_id\nE5,Router,IDF-1,EEE\nE6,Router,IDF-1,AAA\n";
        let err = store.import_equipment_csv("org1", csv).unwrap_err();
        assert!(matches!(err, StoreError::TagInUse { .. }));
        assert_eq!(store.equipment_at("org1", "IDF-1").unwrap().len(), 2);

        let csv = "equipo_id,ubicacion_id,rfid_tag_id\nE5,IDF-1,EEE\nE6,IDF-1,\n";
        assert_eq!(store.import_equipment_csv("org1", csv).unwrap(), 2);
        let all = store.equipment_at("org1", "IDF-1").unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[2].nombre, "E5");
        assert_eq!(all[3].rfid_tag_id, None);
    }

    #[test]
    fn organization_index_lists_tagged_only() {
        let store = seeded();
        let index = store.registered_tags_for_organization("org1").unwrap();
        assert_eq!(
            index,
            vec![RegisteredTag {
                rfid_tag_id: "AAA".into(),
                equipo_id: "E1".into(),
                ubicacion_id: "IDF-1".into(),
            }]
        );
    }

    #[test]
    fn locations_listed_by_name() {
        let store = seeded();
        let names: Vec<String> = store
            .list_locations("org1")
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(names, vec!["IDF-1", "P1"]);
        assert!(store.list_locations("org2").unwrap().is_empty());
    }

    #[test]
    fn parent_must_exist() {
        let store = seeded();
        let mut rack = closet("R1", LocationKind::Rack);
        rack.parent_id = Some("missing".into());
        assert!(matches!(
            store.add_location("org1", &rack).unwrap_err(),
            StoreError::UnknownLocation(_)
        ));
        rack.parent_id = Some("IDF-1".into());
        store.add_location("org1", &rack).unwrap();
        assert_eq!(store.location("org1", "R1").unwrap().unwrap().parent_id.as_deref(), Some("IDF-1"));
    }
}
