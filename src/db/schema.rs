//! SQL DDL for all souschef tables.
//!
//! Defines the `recipes`, `recipes_vec` (vec0), `recipe_favorites`, and
//! `schema_meta` tables. All DDL uses `IF NOT EXISTS` for idempotent
//! initialization. Ingredient, instruction, and tag lists are stored as JSON
//! arrays; macro fields are constrained non-negative at the schema level.

use rusqlite::Connection;

/// All schema DDL statements for souschef's core tables.
const SCHEMA_SQL: &str = r#"
-- Persisted recipes
CREATE TABLE IF NOT EXISTS recipes (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    name TEXT NOT NULL CHECK(length(name) > 0),
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL DEFAULT '',
    cuisine TEXT NOT NULL DEFAULT '',
    ingredients TEXT NOT NULL,
    instructions TEXT NOT NULL,
    dietary_tags TEXT NOT NULL DEFAULT '[]',
    tags TEXT NOT NULL DEFAULT '[]',
    calories REAL NOT NULL DEFAULT 0 CHECK(calories >= 0),
    protein REAL NOT NULL DEFAULT 0 CHECK(protein >= 0),
    carbs REAL NOT NULL DEFAULT 0 CHECK(carbs >= 0),
    fat REAL NOT NULL DEFAULT 0 CHECK(fat >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_recipes_owner ON recipes(owner);
CREATE INDEX IF NOT EXISTS idx_recipes_category ON recipes(category);
CREATE INDEX IF NOT EXISTS idx_recipes_cuisine ON recipes(cuisine);

-- Favorite markers (many-to-many user <-> recipe)
CREATE TABLE IF NOT EXISTS recipe_favorites (
    id TEXT PRIMARY KEY,
    recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(recipe_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_favorites_user ON recipe_favorites(user_id);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// vec0 virtual table must be created separately (sqlite-vec syntax).
const VEC_TABLE_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS recipes_vec USING vec0(
    id TEXT PRIMARY KEY,
    embedding FLOAT[1536]
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(VEC_TABLE_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"recipes".to_string()));
        assert!(tables.contains(&"recipe_favorites".to_string()));
        assert!(tables.contains(&"schema_meta".to_string()));

        // Verify the vec0 virtual table is usable
        let version: String = conn
            .query_row("SELECT vec_version()", [], |r| r.get(0))
            .unwrap();
        assert!(!version.is_empty());
    }

    #[test]
    fn schema_is_idempotent() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn negative_macros_rejected_by_schema() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO recipes (id, owner, name, ingredients, instructions, calories, created_at, updated_at) \
             VALUES ('r1', 'u1', 'Toast', '[\"bread\"]', '[\"toast it\"]', -10.0, '2026-01-01', '2026-01-01')",
            [],
        );
        assert!(result.is_err());
    }
}
