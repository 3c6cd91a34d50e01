use anyhow::Result;
use std::process;

use larder_core::service::PantryService;

use super::helpers::json_error;

pub(crate) fn cmd_user_add(
    svc: &PantryService,
    username: &str,
    email: &str,
    password: &str,
    json: bool,
) -> Result<()> {
    let user = svc.register_user(username, email, password)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        let id = user.id;
        println!("Added user {username} <{email}> (id: {id})");
    }
    Ok(())
}

pub(crate) fn cmd_user_search(svc: &PantryService, email: &str, json: bool) -> Result<()> {
    match svc.search_user_by_email(email)? {
        Some(user) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                let username = &user.username;
                let id = user.id;
                println!("{username} <{email}> (id: {id})");
            }
        }
        None => {
            if json {
                println!("{}", json_error(&format!("No user found with email '{email}'")));
            } else {
                eprintln!("No user found with email '{email}'");
            }
            process::exit(2);
        }
    }
    Ok(())
}

pub(crate) fn cmd_user_delete(svc: &PantryService, email: &str, json: bool) -> Result<()> {
    if svc.delete_user_by_email(email)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": email }));
        } else {
            println!("Deleted user <{email}> and everything they owned");
        }
    } else {
        let msg = format!("No user found with email '{email}'");
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    }
    Ok(())
}
