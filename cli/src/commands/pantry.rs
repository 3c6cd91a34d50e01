use anyhow::Result;
use std::process;

use larder_core::models::parse_date;
use larder_core::service::PantryService;

use super::helpers::{json_error, print_item_table};

pub(crate) fn cmd_item_add(
    svc: &PantryService,
    name: &str,
    quantity: i64,
    expiry: &str,
    user_id: i64,
    json: bool,
) -> Result<()> {
    let expiry_date = parse_date(expiry)?;
    let item = svc.add_pantry_item(name, quantity, expiry_date, user_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        let id = item.id;
        println!("Added {quantity}x {name} (id: {id}, expires {expiry})");
    }
    Ok(())
}

pub(crate) fn cmd_item_search(svc: &PantryService, name: &str, json: bool) -> Result<()> {
    let items = svc.search_pantry_items(name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if items.is_empty() {
        println!("No pantry items matching '{name}'");
    } else {
        print_item_table(&items);
    }
    Ok(())
}

pub(crate) fn cmd_item_list(svc: &PantryService, user_id: i64, json: bool) -> Result<()> {
    let items = svc.pantry_items_for_user(user_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if items.is_empty() {
        println!("No pantry items for user {user_id}");
    } else {
        print_item_table(&items);
    }
    Ok(())
}

pub(crate) fn cmd_item_delete(svc: &PantryService, item_id: i64, json: bool) -> Result<()> {
    if svc.delete_pantry_item(item_id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": item_id }));
        } else {
            println!("Deleted pantry item {item_id}");
        }
    } else {
        let msg = format!("No pantry item found with id {item_id}");
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    }
    Ok(())
}
