use std::path::Path;

use anyhow::{Result, anyhow};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::NaiveDate;

use crate::db::Database;
use crate::models::{
    Favorite, NewFavorite, NewPantryItem, NewRecipe, NewUser, PantryItem, Recipe, User,
    validate_quantity,
};

/// Facade over the store, shared by the REST handlers and the CLI commands.
///
/// Owns the steps that don't belong in SQL: password hashing on registration
/// and quantity validation. One service instance wraps one connection; callers
/// decide how to share it (the server wraps it in `Arc<Mutex<_>>`).
pub struct PantryService {
    db: Database,
}

impl PantryService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Users ---

    /// Hashes the password with argon2 and stores the new user.
    /// The plaintext never reaches the store.
    pub fn register_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let password_hash = hash_password(password)?;
        self.db.insert_user(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
    }

    pub fn search_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.db.get_user_by_email(email)
    }

    pub fn delete_user_by_email(&self, email: &str) -> Result<bool> {
        self.db.delete_user_by_email(email)
    }

    // --- Pantry items ---

    pub fn add_pantry_item(
        &self,
        name: &str,
        quantity: i64,
        expiry_date: NaiveDate,
        user_id: i64,
    ) -> Result<PantryItem> {
        validate_quantity(quantity)?;
        self.db.insert_pantry_item(&NewPantryItem {
            name: name.to_string(),
            quantity,
            expiry_date: Some(expiry_date),
            user_id,
        })
    }

    pub fn search_pantry_items(&self, name: &str) -> Result<Vec<PantryItem>> {
        self.db.search_pantry_items_by_name(name)
    }

    pub fn pantry_items_for_user(&self, user_id: i64) -> Result<Vec<PantryItem>> {
        self.db.get_pantry_items_by_user(user_id)
    }

    pub fn delete_pantry_item(&self, id: i64) -> Result<bool> {
        self.db.delete_pantry_item(id)
    }

    // --- Recipes ---

    pub fn add_recipe(&self, name: &str, instructions: &str, user_id: i64) -> Result<Recipe> {
        self.db.insert_recipe(&NewRecipe {
            name: name.to_string(),
            instructions: instructions.to_string(),
            user_id,
        })
    }

    pub fn search_recipe_by_name(&self, name: &str) -> Result<Option<Recipe>> {
        self.db.get_recipe_by_name(name)
    }

    pub fn delete_recipe_by_name(&self, name: &str) -> Result<bool> {
        self.db.delete_recipe_by_name(name)
    }

    // --- Favorites ---

    pub fn add_favorite(&self, user_id: i64, recipe_id: i64) -> Result<Favorite> {
        self.db.insert_favorite(&NewFavorite { user_id, recipe_id })
    }

    pub fn favorites_for_user(&self, user_id: i64) -> Result<Vec<Favorite>> {
        self.db.get_favorites_by_user(user_id)
    }

    pub fn delete_favorite(&self, id: i64) -> Result<bool> {
        self.db.delete_favorite(id)
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Returns `Ok(false)` for a wrong password; `Err` only for a malformed hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("invalid password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> PantryService {
        PantryService::new_in_memory().unwrap()
    }

    #[test]
    fn register_stores_a_hash_not_the_plaintext() {
        let svc = test_service();
        let user = svc
            .register_user("alice", "alice@example.com", "hunter2")
            .unwrap();

        assert_ne!(user.password_hash, "hunter2");
        assert!(user.password_hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &user.password_hash).unwrap());
        assert!(!verify_password("wrong", &user.password_hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently_per_user() {
        let svc = test_service();
        let a = svc
            .register_user("alice", "alice@example.com", "hunter2")
            .unwrap();
        let b = svc
            .register_user("bob", "bob@example.com", "hunter2")
            .unwrap();
        // Salted: identical passwords must not produce identical hashes
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn register_then_search_then_delete() {
        let svc = test_service();
        svc.register_user("alice", "alice@example.com", "pw").unwrap();

        let found = svc.search_user_by_email("alice@example.com").unwrap();
        assert_eq!(found.unwrap().username, "alice");

        assert!(svc.delete_user_by_email("alice@example.com").unwrap());
        assert!(svc.search_user_by_email("alice@example.com").unwrap().is_none());
    }

    #[test]
    fn add_pantry_item_validates_quantity() {
        let svc = test_service();
        let user = svc.register_user("alice", "alice@example.com", "pw").unwrap();
        let date = crate::models::parse_date("2025-06-01").unwrap();

        assert!(svc.add_pantry_item("Rice", 0, date, user.id).is_err());

        let item = svc.add_pantry_item("Rice", 3, date, user.id).unwrap();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.expiry_date.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn recipes_and_favorites_flow() {
        let svc = test_service();
        let user = svc.register_user("alice", "alice@example.com", "pw").unwrap();

        let recipe = svc
            .add_recipe("Porridge", "Simmer oats in milk.", user.id)
            .unwrap();
        assert_eq!(
            svc.search_recipe_by_name("Porridge").unwrap().unwrap().id,
            recipe.id
        );

        let favorite = svc.add_favorite(user.id, recipe.id).unwrap();
        let favorites = svc.favorites_for_user(user.id).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, favorite.id);

        assert!(svc.delete_favorite(favorite.id).unwrap());
        assert!(svc.delete_recipe_by_name("Porridge").unwrap());
        assert!(svc.search_recipe_by_name("Porridge").unwrap().is_none());
    }
}
