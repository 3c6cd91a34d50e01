use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use larder_core::models::PantryItem;

pub(crate) fn json_error(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Qty")]
    quantity: i64,
    #[tabled(rename = "Expires")]
    expiry: String,
    #[tabled(rename = "User")]
    user_id: i64,
}

pub(crate) fn print_item_table(items: &[PantryItem]) {
    let rows: Vec<ItemRow> = items
        .iter()
        .map(|item| ItemRow {
            id: item.id,
            name: item.name.clone(),
            quantity: item.quantity,
            expiry: item.expiry_date.clone().unwrap_or_else(|| "-".to_string()),
            user_id: item.user_id,
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()));
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_error_shape() {
        let out = json_error("boom");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["error"], "boom");
    }

    #[test]
    fn print_item_table_does_not_panic_on_empty() {
        print_item_table(&[]);
    }
}
