use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};

use crate::models::{
    DATE_FORMAT, Favorite, NewFavorite, NewPantryItem, NewRecipe, NewUser, PantryItem, Recipe,
    User,
};

/// The store rejected a write because of a UNIQUE or FOREIGN KEY constraint.
///
/// Kept as a distinct type so callers can map it to a conflict response
/// instead of a generic persistence failure.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ConstraintViolation(pub String);

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    fn configure(&self) -> Result<()> {
        // SQLite ships with foreign keys off; every integrity guarantee in the
        // schema depends on this pragma.
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS pantry_items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    quantity INTEGER NOT NULL DEFAULT 1,
                    expiry_date TEXT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS recipes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    instructions TEXT NOT NULL,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS favorites (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
                CREATE INDEX IF NOT EXISTS idx_pantry_items_user ON pantry_items(user_id);
                CREATE INDEX IF NOT EXISTS idx_pantry_items_name ON pantry_items(name);
                CREATE INDEX IF NOT EXISTS idx_recipes_name ON recipes(name);
                CREATE INDEX IF NOT EXISTS idx_favorites_user ON favorites(user_id);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    /// Wrap a write failure, surfacing constraint rejections as a typed error.
    fn write_err(err: rusqlite::Error, what: &str) -> anyhow::Error {
        match err {
            rusqlite::Error::SqliteFailure(e, ref msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = msg
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string());
                ConstraintViolation(format!("could not add {what}: {detail}")).into()
            }
            other => other.into(),
        }
    }

    // --- Row mapping helpers ---

    fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            email: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn pantry_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<PantryItem> {
        Ok(PantryItem {
            id: row.get(0)?,
            name: row.get(1)?,
            quantity: row.get(2)?,
            expiry_date: row.get(3)?,
            user_id: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<Recipe> {
        Ok(Recipe {
            id: row.get(0)?,
            name: row.get(1)?,
            instructions: row.get(2)?,
            user_id: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    // --- Users ---

    pub fn insert_user(&self, user: &NewUser) -> Result<User> {
        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO users (username, password_hash, email, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user.username, user.password_hash, user.email, now],
            )
            .map_err(|e| Self::write_err(e, "user"))?;
        let id = self.conn.last_insert_rowid();
        self.get_user_by_id(id)
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<User> {
        self.conn
            .query_row(
                "SELECT id, username, password_hash, email, created_at
                 FROM users WHERE id = ?1",
                params![id],
                Self::user_from_row,
            )
            .context("User not found")
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, password_hash, email, created_at
             FROM users WHERE email = ?1",
        )?;
        let mut rows = stmt.query(params![email])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::user_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Deletes the user and, through the schema's cascades, everything they own.
    pub fn delete_user_by_email(&self, email: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM users WHERE email = ?1", params![email])?;
        Ok(rows > 0)
    }

    // --- Pantry items ---

    pub fn insert_pantry_item(&self, item: &NewPantryItem) -> Result<PantryItem> {
        let now = Local::now().to_rfc3339();
        let expiry = item.expiry_date.map(|d| d.format(DATE_FORMAT).to_string());
        self.conn
            .execute(
                "INSERT INTO pantry_items (name, quantity, expiry_date, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![item.name, item.quantity, expiry, item.user_id, now],
            )
            .map_err(|e| Self::write_err(e, "pantry item"))?;
        let id = self.conn.last_insert_rowid();
        self.get_pantry_item_by_id(id)
    }

    pub fn get_pantry_item_by_id(&self, id: i64) -> Result<PantryItem> {
        self.conn
            .query_row(
                "SELECT id, name, quantity, expiry_date, user_id, created_at
                 FROM pantry_items WHERE id = ?1",
                params![id],
                Self::pantry_item_from_row,
            )
            .context("Pantry item not found")
    }

    /// Case-insensitive substring match on the item name.
    pub fn search_pantry_items_by_name(&self, query: &str) -> Result<Vec<PantryItem>> {
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        let mut stmt = self.conn.prepare(
            "SELECT id, name, quantity, expiry_date, user_id, created_at
             FROM pantry_items WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name",
        )?;
        let items = stmt
            .query_map(params![pattern], Self::pantry_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn get_pantry_items_by_user(&self, user_id: i64) -> Result<Vec<PantryItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, quantity, expiry_date, user_id, created_at
             FROM pantry_items WHERE user_id = ?1 ORDER BY id",
        )?;
        let items = stmt
            .query_map(params![user_id], Self::pantry_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn delete_pantry_item(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM pantry_items WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Recipes ---

    pub fn insert_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO recipes (name, instructions, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![recipe.name, recipe.instructions, recipe.user_id, now],
            )
            .map_err(|e| Self::write_err(e, "recipe"))?;
        let id = self.conn.last_insert_rowid();
        self.get_recipe_by_id(id)
    }

    pub fn get_recipe_by_id(&self, id: i64) -> Result<Recipe> {
        self.conn
            .query_row(
                "SELECT id, name, instructions, user_id, created_at
                 FROM recipes WHERE id = ?1",
                params![id],
                Self::recipe_from_row,
            )
            .context("Recipe not found")
    }

    /// Exact-name lookup; returns the oldest match when names collide.
    pub fn get_recipe_by_name(&self, name: &str) -> Result<Option<Recipe>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, instructions, user_id, created_at
             FROM recipes WHERE name = ?1 ORDER BY id LIMIT 1",
        )?;
        let mut rows = stmt.query(params![name])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::recipe_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn delete_recipe_by_name(&self, name: &str) -> Result<bool> {
        let Some(recipe) = self.get_recipe_by_name(name)? else {
            return Ok(false);
        };
        self.conn
            .execute("DELETE FROM recipes WHERE id = ?1", params![recipe.id])?;
        Ok(true)
    }

    // --- Favorites ---

    pub fn insert_favorite(&self, favorite: &NewFavorite) -> Result<Favorite> {
        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO favorites (user_id, recipe_id, created_at)
                 VALUES (?1, ?2, ?3)",
                params![favorite.user_id, favorite.recipe_id, now],
            )
            .map_err(|e| Self::write_err(e, "favorite"))?;
        let id = self.conn.last_insert_rowid();
        self.conn
            .query_row(
                "SELECT id, user_id, recipe_id, created_at FROM favorites WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Favorite {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        recipe_id: row.get(2)?,
                        created_at: row.get(3)?,
                        recipe_name: None,
                    })
                },
            )
            .context("Favorite not found")
    }

    pub fn get_favorites_by_user(&self, user_id: i64) -> Result<Vec<Favorite>> {
        let mut stmt = self.conn.prepare(
            "SELECT f.id, f.user_id, f.recipe_id, f.created_at, r.name
             FROM favorites f
             JOIN recipes r ON f.recipe_id = r.id
             WHERE f.user_id = ?1
             ORDER BY f.id",
        )?;
        let favorites = stmt
            .query_map(params![user_id], |row| {
                Ok(Favorite {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    recipe_id: row.get(2)?,
                    created_at: row.get(3)?,
                    recipe_name: Some(row.get(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(favorites)
    }

    pub fn delete_favorite(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM favorites WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Test helpers ---

    #[cfg(test)]
    pub(crate) fn count(&self, table: &str) -> i64 {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }
}
