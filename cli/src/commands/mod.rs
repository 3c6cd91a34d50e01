mod helpers;
mod pantry;
mod recipe;
mod user;

pub(crate) use pantry::{cmd_item_add, cmd_item_delete, cmd_item_list, cmd_item_search};
pub(crate) use recipe::{
    cmd_favorite_add, cmd_favorite_list, cmd_favorite_remove, cmd_recipe_add, cmd_recipe_delete,
    cmd_recipe_search,
};
pub(crate) use user::{cmd_user_add, cmd_user_delete, cmd_user_search};
