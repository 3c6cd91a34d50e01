use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized into responses.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PantryItem {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    /// Stored and serialized as YYYY-MM-DD.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub user_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewPantryItem {
    pub name: String,
    pub quantity: i64,
    pub expiry_date: Option<NaiveDate>,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub instructions: String,
    pub user_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub instructions: String,
    pub user_id: i64,
}

/// Join entity linking a user to a recipe. Duplicate pairs are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub created_at: String,
    // Joined recipe name for display, when the query provides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub user_id: i64,
    pub recipe_id: i64,
}

pub fn validate_quantity(quantity: i64) -> Result<()> {
    if quantity < 1 {
        bail!("quantity must be at least 1 (got {quantity})");
    }
    Ok(())
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| anyhow::anyhow!("Invalid date '{input}'. Use YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(12).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn parse_date_accepts_iso() {
        let date = parse_date("2025-03-14").unwrap();
        assert_eq!(date.format(DATE_FORMAT).to_string(), "2025-03-14");
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("14/03/2025").is_err());
        assert!(parse_date("2025-13-40").is_err());
        assert!(parse_date("soon").is_err());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("alice@example.com"));
    }

    #[test]
    fn pantry_item_serializes_expiry_as_plain_string() {
        let item = PantryItem {
            id: 7,
            name: "Oats".to_string(),
            quantity: 2,
            expiry_date: Some("2025-06-01".to_string()),
            user_id: 1,
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&item).unwrap();
        assert_eq!(json["expiry_date"], "2025-06-01");
        assert_eq!(json["quantity"], 2);
    }
}
