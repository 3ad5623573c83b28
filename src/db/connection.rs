use super::schema;
use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

pub fn establish_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    schema::initialize_schema(&conn)?;
    info!(path = %path.display(), "database ready");
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", true)?;
    schema::initialize_schema(&conn)?;
    Ok(conn)
}
