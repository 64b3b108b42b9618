//! RPC method handler for the Deckodecko JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdin/stdout.
//! `handle_method` maps a method name and its params onto the repositories
//! and services held by [`App`].

use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};

use crate::app::App;
use crate::database::query_builder::{columns, SelectOptions};
use crate::managers::folder_repository::{FolderRepository, FolderRepositoryTrait};
use crate::managers::image_repository::{ImageRepository, ImageRepositoryTrait};
use crate::managers::item_repository::{ItemRepository, ItemRepositoryTrait};
use crate::services::bookmark_view;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::errors::StorageError;
use crate::types::folder::{Folder, DEFAULT_FOLDER_ID};
use crate::types::item::{BookmarkType, ItemPatch, NewItem};

fn param_i64(params: &Value, key: &str) -> Result<i64, String> {
    params
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("missing {}", key))
}

fn param_opt_i64(params: &Value, key: &str) -> Result<Option<i64>, String> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| format!("invalid {}", key)),
    }
}

fn param_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing {}", key))
}

fn param_kind(params: &Value) -> Result<BookmarkType, String> {
    BookmarkType::from_str(param_str(params, "type")?)
}

fn to_json<T: Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

fn storage<T>(result: Result<T, StorageError>) -> Result<T, String> {
    result.map_err(|e| e.to_string())
}

/// Dispatch one RPC call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    let store = &app.store;
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Folders ───
        "folder.list" => to_json(storage(
            store.run(|conn| FolderRepository::new(conn).get_all()).await,
        )?),
        "folder.get" => {
            let id = param_i64(params, "id")?;
            to_json(storage(
                store.run(move |conn| FolderRepository::new(conn).get_by_id(id)).await,
            )?)
        }
        "folder.create" => {
            let name = param_str(params, "name")?.trim().to_string();
            let sequence = param_opt_i64(params, "sequence")?;
            let folder = storage(
                store
                    .run(move |conn| {
                        let mut repo = FolderRepository::new(conn);
                        if repo.find_by_name(&name)?.is_some() {
                            return Err(StorageError::Validation(format!(
                                "folder '{}' already exists",
                                name
                            )));
                        }
                        let sequence = match sequence {
                            Some(s) => s,
                            None => repo.next_sequence()?,
                        };
                        let id = repo.create(&name, sequence)?;
                        repo.get_by_id(id)?
                            .ok_or_else(|| StorageError::NotFound(format!("folder {}", id)))
                    })
                    .await,
            )?;
            to_json(folder)
        }
        "folder.rename" => {
            let id = param_i64(params, "id")?;
            let name = param_str(params, "name")?.to_string();
            let ok = storage(
                store
                    .run(move |conn| FolderRepository::new(conn).rename(id, &name))
                    .await,
            )?;
            Ok(json!({"ok": ok}))
        }
        "folder.reorder" => {
            let ids: Vec<i64> = params
                .get("ids")
                .cloned()
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| format!("invalid ids: {}", e))?
                .ok_or("missing ids")?;
            storage(
                store
                    .run(move |conn| {
                        let mut repo = FolderRepository::new(conn);
                        let known = repo.get_all()?;
                        let ordered = ids
                            .iter()
                            .map(|id| {
                                known
                                    .iter()
                                    .find(|f| f.id == *id)
                                    .cloned()
                                    .ok_or_else(|| StorageError::NotFound(format!("folder {}", id)))
                            })
                            .collect::<Result<Vec<Folder>, _>>()?;
                        repo.update_sequence(&ordered)
                    })
                    .await,
            )?;
            Ok(json!({"ok": true}))
        }
        "folder.delete" => {
            let id = param_i64(params, "id")?;
            if id == DEFAULT_FOLDER_ID {
                return Err("the default folder cannot be deleted".to_string());
            }
            let ok = storage(store.run(move |conn| FolderRepository::new(conn).delete(id)).await)?;
            Ok(json!({"ok": ok}))
        }
        "folder.next_sequence" => {
            let next = storage(
                store.run(|conn| FolderRepository::new(conn).next_sequence()).await,
            )?;
            Ok(json!({"sequence": next}))
        }

        // ─── Items ───
        "item.create" => {
            let item: NewItem =
                serde_json::from_value(params.clone()).map_err(|e| format!("invalid item: {}", e))?;
            let id = storage(store.run(move |conn| ItemRepository::new(conn).create(&item)).await)?;
            Ok(json!({"id": id}))
        }
        "item.list" => {
            let folder = param_opt_i64(params, "folder_id")?;
            to_json(storage(
                store
                    .run(move |conn| {
                        let repo = ItemRepository::new(conn);
                        match folder {
                            Some(folder_id) => repo.get_by_folder_id(folder_id),
                            None => repo.get_all(),
                        }
                    })
                    .await,
            )?)
        }
        "item.get" => {
            let id = param_i64(params, "id")?;
            to_json(storage(store.run(move |conn| ItemRepository::new(conn).get_by_id(id)).await)?)
        }
        "item.by_gacha" => {
            let gacha_id = param_i64(params, "gacha_id")?;
            to_json(storage(
                store
                    .run(move |conn| ItemRepository::new(conn).get_by_gacha_id(gacha_id))
                    .await,
            )?)
        }
        "item.by_name" => {
            let name = param_str(params, "name")?.to_string();
            to_json(storage(
                store
                    .run(move |conn| ItemRepository::new(conn).get_by_name(&name))
                    .await,
            )?)
        }
        "item.update" => {
            let id = param_i64(params, "id")?;
            let patch: ItemPatch = serde_json::from_value(params.get("patch").cloned().unwrap_or(json!({})))
                .map_err(|e| format!("invalid patch: {}", e))?;
            let updated = storage(
                store
                    .run(move |conn| ItemRepository::new(conn).update(id, &patch))
                    .await,
            )?;
            Ok(json!({"updated": updated}))
        }
        "item.delete" => {
            let id = param_i64(params, "id")?;
            let ok = storage(store.run(move |conn| ItemRepository::new(conn).delete(id)).await)?;
            Ok(json!({"ok": ok}))
        }
        "item.clear" => {
            let removed = storage(store.run(|conn| ItemRepository::new(conn).clear()).await)?;
            Ok(json!({"ok": true, "removed": removed}))
        }
        "item.migrate" => to_json(storage(
            store.run(|conn| ItemRepository::new(conn).migrate()).await,
        )?),

        // ─── Images ───
        "image.create" => {
            let uri = param_str(params, "uri")?.to_string();
            let id = storage(store.run(move |conn| ImageRepository::new(conn).create(&uri)).await)?;
            Ok(json!({"id": id}))
        }
        "image.list" => {
            let limit = param_opt_i64(params, "limit")?;
            let mut options = SelectOptions::new();
            if let Some(limit) = limit {
                let limit = u32::try_from(limit).map_err(|_| "invalid limit".to_string())?;
                options = options.limit(limit);
            }
            to_json(storage(
                store
                    .run(move |conn| ImageRepository::new(conn).get_all(&options))
                    .await,
            )?)
        }
        "image.delete" => {
            let id = param_i64(params, "id")?;
            let ok = storage(
                store
                    .run(move |conn| ImageRepository::new(conn).delete(&columns([("id", id)])))
                    .await,
            )?;
            Ok(json!({"ok": ok}))
        }

        // ─── Bookmark views ───
        "bookmark.view" => {
            let kind = param_kind(params)?;
            let folder = param_opt_i64(params, "folder_id")?;
            to_json(storage(
                bookmark_view::load_bookmarks(store, &app.catalog, kind, folder).await,
            )?)
        }
        "bookmark.groups" => {
            let kind = param_kind(params)?;
            let folder = param_opt_i64(params, "folder_id")?;
            let entries = storage(
                bookmark_view::load_bookmarks(store, &app.catalog, kind, folder).await,
            )?;
            to_json(bookmark_view::group_by_gacha(entries))
        }

        // ─── Settings ───
        "settings.get" => to_json(app.settings().get_settings().clone()),
        "settings.set" => {
            let key = param_str(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            app.settings()
                .set_value(key, value)
                .map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
