// SQLite schema for the inventory and census history.
//
// Ids are opaque strings supplied by the caller (locations, equipment) or
// generated here (censuses). Every table carries organization_id or hangs off
// a table that does.

pub(crate) const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS organizations (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ubicaciones (
    id TEXT PRIMARY KEY,
    nombre TEXT NOT NULL,
    tipo TEXT NOT NULL,              -- Planta, Edificio, IDF, MDF, Rack
    parent_id TEXT REFERENCES ubicaciones(id) ON DELETE SET NULL,
    organization_id TEXT NOT NULL REFERENCES organizations(id)
);

CREATE TABLE IF NOT EXISTS equipos (
    id TEXT PRIMARY KEY,
    nombre TEXT NOT NULL,
    ubicacion_id TEXT NOT NULL REFERENCES ubicaciones(id) ON DELETE CASCADE,
    rfid_tag_id TEXT,                -- NULL = untagged
    organization_id TEXT NOT NULL REFERENCES organizations(id)
);

CREATE INDEX IF NOT EXISTS idx_equipos_ubicacion ON equipos(organization_id, ubicacion_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_equipos_tag
    ON equipos(organization_id, rfid_tag_id) WHERE rfid_tag_id IS NOT NULL;

CREATE TABLE IF NOT EXISTS rfid_censos (
    id TEXT PRIMARY KEY,
    ubicacion_id TEXT NOT NULL REFERENCES ubicaciones(id),
    organization_id TEXT NOT NULL REFERENCES organizations(id),
    performed_by TEXT NOT NULL,
    created_at TEXT NOT NULL,        -- RFC 3339 UTC, fixed width
    faltantes_count INTEGER NOT NULL,
    no_registrados_count INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_censos_org ON rfid_censos(organization_id, ubicacion_id, created_at);

CREATE TABLE IF NOT EXISTS rfid_censo_tags (
    censo_id TEXT NOT NULL REFERENCES rfid_censos(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    rfid_tag TEXT NOT NULL,
    PRIMARY KEY (censo_id, position)
);

CREATE TABLE IF NOT EXISTS rfid_censo_discrepancias (
    censo_id TEXT NOT NULL REFERENCES rfid_censos(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    tipo TEXT NOT NULL,              -- FALTANTE, NO_REGISTRADO
    equipo_id TEXT,
    rfid_tag_id TEXT,
    PRIMARY KEY (censo_id, position)
);

CREATE TABLE IF NOT EXISTS rfid_censo_fuera_de_ubicacion (
    censo_id TEXT NOT NULL REFERENCES rfid_censos(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    rfid_tag TEXT NOT NULL,
    equipo_id TEXT NOT NULL,
    ubicacion_id TEXT NOT NULL,
    PRIMARY KEY (censo_id, position)
);
"#;
