use anyhow::Result;
use std::process;

use larder_core::service::PantryService;

use super::helpers::json_error;

pub(crate) fn cmd_recipe_add(
    svc: &PantryService,
    name: &str,
    instructions: &str,
    user_id: i64,
    json: bool,
) -> Result<()> {
    let recipe = svc.add_recipe(name, instructions, user_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        let id = recipe.id;
        println!("Added recipe: {name} (id: {id})");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_search(svc: &PantryService, name: &str, json: bool) -> Result<()> {
    match svc.search_recipe_by_name(name)? {
        Some(recipe) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            } else {
                let recipe_name = &recipe.name;
                let owner = recipe.user_id;
                println!("=== {recipe_name} === (user {owner})");
                println!("{}", recipe.instructions);
            }
        }
        None => {
            if json {
                println!("{}", json_error(&format!("No recipe found with name '{name}'")));
            } else {
                eprintln!("No recipe found with name '{name}'");
            }
            process::exit(2);
        }
    }
    Ok(())
}

pub(crate) fn cmd_recipe_delete(svc: &PantryService, name: &str, json: bool) -> Result<()> {
    if svc.delete_recipe_by_name(name)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": name }));
        } else {
            println!("Deleted recipe '{name}'");
        }
    } else {
        let msg = format!("No recipe found with name '{name}'");
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    }
    Ok(())
}

pub(crate) fn cmd_favorite_add(
    svc: &PantryService,
    user_id: i64,
    recipe_id: i64,
    json: bool,
) -> Result<()> {
    let favorite = svc.add_favorite(user_id, recipe_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&favorite)?);
    } else {
        let id = favorite.id;
        println!("Favorited recipe {recipe_id} for user {user_id} (id: {id})");
    }
    Ok(())
}

pub(crate) fn cmd_favorite_list(svc: &PantryService, user_id: i64, json: bool) -> Result<()> {
    let favorites = svc.favorites_for_user(user_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&favorites)?);
    } else if favorites.is_empty() {
        println!("No favorites for user {user_id}");
    } else {
        for favorite in &favorites {
            let id = favorite.id;
            let name = favorite.recipe_name.as_deref().unwrap_or("?");
            println!("  {id}: {name}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_favorite_remove(svc: &PantryService, favorite_id: i64, json: bool) -> Result<()> {
    if svc.delete_favorite(favorite_id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": favorite_id }));
        } else {
            println!("Removed favorite {favorite_id}");
        }
    } else {
        let msg = format!("No favorite found with id {favorite_id}");
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    }
    Ok(())
}
