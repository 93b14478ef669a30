// Census history: header, tag list and report written in one transaction.

use chrono::{DateTime, SecondsFormat, Utc};
use plantnet_census::{
    CensusError, CensusHistory, CensusRecord, Discrepancy, DiscrepancyKind, DiscrepancyReport,
    MisplacedTag, NewCensus,
};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::StoreError;
use crate::inventory::SqliteStore;

struct Header {
    id: String,
    ubicacion_id: String,
    organization_id: String,
    performed_by: String,
    created_at: String,
    faltantes_count: i64,
    no_registrados_count: i64,
}

impl SqliteStore {
    fn record(&self, census: NewCensus) -> Result<String, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        let in_org = tx
            .query_row(
                "SELECT 1 FROM ubicaciones WHERE id = ?1 AND organization_id = ?2",
                params![census.ubicacion_id, census.organization_id],
                |_| Ok(()),
            )
            .optional()?;
        if in_org.is_none() {
            return Err(StoreError::UnknownLocation(census.ubicacion_id));
        }

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let report = &census.report;

        tx.execute(
            "INSERT INTO rfid_censos
                (id, ubicacion_id, organization_id, performed_by, created_at,
                 faltantes_count, no_registrados_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                census.ubicacion_id,
                census.organization_id,
                census.performed_by,
                created_at,
                report.faltantes_count() as i64,
                report.no_registrados_count() as i64,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO rfid_censo_tags (censo_id, position, rfid_tag) VALUES (?1, ?2, ?3)",
            )?;
            for (pos, tag) in census.rfid_tags_leidos.iter().enumerate() {
                stmt.execute(params![id, pos as i64, tag])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO rfid_censo_discrepancias (censo_id, position, tipo, equipo_id, rfid_tag_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (pos, d) in report.discrepancias().iter().enumerate() {
                let (equipo_id, rfid_tag_id) = match d {
                    Discrepancy::Faltante { equipo_id } => (Some(equipo_id.as_str()), None),
                    Discrepancy::NoRegistrado { rfid_tag_id } => (None, Some(rfid_tag_id.as_str())),
                };
                stmt.execute(params![id, pos as i64, d.kind().as_str(), equipo_id, rfid_tag_id])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO rfid_censo_fuera_de_ubicacion
                    (censo_id, position, rfid_tag, equipo_id, ubicacion_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (pos, m) in report.fuera_de_ubicacion().iter().enumerate() {
                stmt.execute(params![id, pos as i64, m.rfid_tag_id, m.equipo_id, m.ubicacion_id])?;
            }
        }

        tx.commit()?;
        Ok(id)
    }

    fn headers(&self, organization_id: &str, location: Option<&str>) -> Result<Vec<Header>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ubicacion_id, organization_id, performed_by, created_at,
                    faltantes_count, no_registrados_count
             FROM rfid_censos
             WHERE organization_id = ?1 AND (?2 IS NULL OR ubicacion_id = ?2)
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![organization_id, location], header_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn header(&self, organization_id: &str, id: &str) -> Result<Option<Header>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, ubicacion_id, organization_id, performed_by, created_at,
                        faltantes_count, no_registrados_count
                 FROM rfid_censos WHERE id = ?1 AND organization_id = ?2",
                params![id, organization_id],
                header_from_row,
            )
            .optional()?)
    }

    fn hydrate(&self, header: Header) -> Result<CensusRecord, StoreError> {
        let rfid_tags_leidos = load_tags(&self.conn, &header.id)?;
        let discrepancias = load_discrepancias(&self.conn, &header.id)?;
        let misplaced = load_misplaced(&self.conn, &header.id)?;
        let report = DiscrepancyReport::new(discrepancias, misplaced);

        if report.faltantes_count() as i64 != header.faltantes_count
            || report.no_registrados_count() as i64 != header.no_registrados_count
        {
            return Err(StoreError::Corrupt(format!(
                "census {}: stored counts ({}, {}) disagree with discrepancies ({}, {})",
                header.id,
                header.faltantes_count,
                header.no_registrados_count,
                report.faltantes_count(),
                report.no_registrados_count(),
            )));
        }

        let created_at = DateTime::parse_from_rfc3339(&header.created_at)
            .map_err(|e| StoreError::Corrupt(format!("census {}: created_at: {e}", header.id)))?
            .with_timezone(&Utc);

        Ok(CensusRecord {
            id: header.id,
            ubicacion_id: header.ubicacion_id,
            organization_id: header.organization_id,
            performed_by: header.performed_by,
            created_at,
            rfid_tags_leidos,
            report,
        })
    }
}

fn header_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Header> {
    Ok(Header {
        id: row.get(0)?,
        ubicacion_id: row.get(1)?,
        organization_id: row.get(2)?,
        performed_by: row.get(3)?,
        created_at: row.get(4)?,
        faltantes_count: row.get(5)?,
        no_registrados_count: row.get(6)?,
    })
}

fn load_tags(conn: &Connection, censo_id: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT rfid_tag FROM rfid_censo_tags WHERE censo_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![censo_id], |row| row.get(0))?;
    Ok(rows.collect::<Result<Vec<String>, _>>()?)
}

fn load_discrepancias(conn: &Connection, censo_id: &str) -> Result<Vec<Discrepancy>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT tipo, equipo_id, rfid_tag_id FROM rfid_censo_discrepancias
         WHERE censo_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![censo_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (tipo, equipo_id, rfid_tag_id) = row?;
        let d = match (DiscrepancyKind::parse(&tipo), equipo_id, rfid_tag_id) {
            (Some(DiscrepancyKind::Faltante), Some(equipo_id), _) => Discrepancy::Faltante { equipo_id },
            (Some(DiscrepancyKind::NoRegistrado), _, Some(rfid_tag_id)) => {
                Discrepancy::NoRegistrado { rfid_tag_id }
            }
            _ => {
                return Err(StoreError::Corrupt(format!(
                    "census {censo_id}: bad discrepancy row of type '{tipo}'"
                )))
            }
        };
        out.push(d);
    }
    Ok(out)
}

fn load_misplaced(conn: &Connection, censo_id: &str) -> Result<Vec<MisplacedTag>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT rfid_tag, equipo_id, ubicacion_id FROM rfid_censo_fuera_de_ubicacion
         WHERE censo_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![censo_id], |row| {
        Ok(MisplacedTag {
            rfid_tag_id: row.get(0)?,
            equipo_id: row.get(1)?,
            ubicacion_id: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

impl CensusHistory for SqliteStore {
    fn record_census(&self, census: NewCensus) -> Result<String, CensusError> {
        Ok(self.record(census)?)
    }

    fn list_censuses(
        &self,
        organization_id: &str,
        location: Option<&str>,
    ) -> Result<Vec<CensusRecord>, CensusError> {
        let headers = self.headers(organization_id, location)?;
        let mut records = Vec::with_capacity(headers.len());
        for header in headers {
            records.push(self.hydrate(header)?);
        }
        Ok(records)
    }

    fn get_census(&self, organization_id: &str, id: &str) -> Result<Option<CensusRecord>, CensusError> {
        match self.header(organization_id, id)? {
            Some(header) => Ok(Some(self.hydrate(header)?)),
            None => Ok(None),
        }
    }

    fn delete_census(&self, organization_id: &str, id: &str) -> Result<bool, CensusError> {
        // Tags, discrepancies and misplaced rows go with the header (ON DELETE CASCADE).
        let deleted = self
            .conn
            .execute(
                "DELETE FROM rfid_censos WHERE id = ?1 AND organization_id = ?2",
                params![id, organization_id],
            )
            .map_err(StoreError::from)?;
        if deleted > 0 {
            log::info!("deleted census {id} from {organization_id}");
        }
        Ok(deleted > 0)
    }
}
