//! Deckodecko: on-device bookmark storage for the gacha catalog app.
//!
//! Entry point: runs a console demo of the storage layer against an
//! in-memory database. The app shell talks to the `deckodecko-rpc` binary.

use deckodecko::database::Store;
use deckodecko::managers::folder_repository::{FolderRepository, FolderRepositoryTrait};
use deckodecko::managers::image_repository::{ImageRepository, ImageRepositoryTrait};
use deckodecko::managers::item_repository::{ItemRepository, ItemRepositoryTrait};
use deckodecko::services::bookmark_view;
use deckodecko::services::catalog_client::StaticCatalog;
use deckodecko::services::flag_store::MemoryFlagStore;
use deckodecko::services::migration_gate;
use deckodecko::types::catalog::CatalogEntry;
use deckodecko::types::item::{BookmarkType, ItemDraft, ItemPatch, NewItem};
use deckodecko::types::settings::AppSettings;

type DemoResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> DemoResult {
    deckodecko::logging::init_logging("warn");

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Deckodecko v{} — Demo Mode                   ║", env!("CARGO_PKG_VERSION"));
    println!("║        Bookmark folders and items, stored on device          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let store = Store::in_memory();
    demo_database(&store).await?;
    demo_folders(&store).await?;
    demo_items(&store).await?;
    demo_images(&store).await?;
    demo_bookmark_view(&store).await?;
    demo_migration_gate(&store).await?;
    demo_settings();
    store.close().await;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ Storage layer demonstrated successfully!");
    println!("═══════════════════════════════════════════════════════════════");
    Ok(())
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

async fn demo_database(store: &Store) -> DemoResult {
    section("Database Layer");
    let tables: Vec<String> = store
        .run(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )?;
            let names = stmt.query_map([], |row| row.get(0))?;
            Ok(names.collect::<Result<Vec<String>, _>>()?)
        })
        .await?;
    println!("  Created {} tables: {}", tables.len(), tables.join(", "));
    println!("  ✓ Connection + bootstrap OK");
    println!();
    Ok(())
}

async fn demo_folders(store: &Store) -> DemoResult {
    section("Folder Repository");
    let folders = store
        .run(|conn| {
            let mut repo = FolderRepository::new(conn);
            let figures = repo.create("피규어", repo.next_sequence()?)?;
            let keyrings = repo.create("키링", repo.next_sequence()?)?;
            let mut all = repo.get_all()?;
            // move 키링 in front of 피규어
            let at = all.iter().position(|f| f.id == keyrings).unwrap_or(0);
            let moved = all.remove(at);
            let before = all.iter().position(|f| f.id == figures).unwrap_or(0);
            all.insert(before, moved);
            repo.update_sequence(&all)?;
            repo.get_all()
        })
        .await?;
    for folder in &folders {
        println!("  [{}] #{} {}", folder.sequence, folder.id, folder.name);
    }
    println!("  ✓ Create + reorder OK");
    println!();
    Ok(())
}

async fn demo_items(store: &Store) -> DemoResult {
    section("Item Repository");
    let (item, duplicate) = store
        .run(|conn| {
            let mut repo = ItemRepository::new(conn);
            let id = repo.create(&NewItem::new(101, BookmarkType::Wish, "미니 피규어 시리즈"))?;
            let duplicate = repo.create(&NewItem::new(101, BookmarkType::Wish, "again"));

            let original = repo.get_by_id(id)?.map(|i| ItemDraft::from(&i));
            if let Some(original) = original {
                let mut desired = original.clone();
                desired.memo = Some("2번 칸 확인".to_string());
                desired.kind = BookmarkType::Get;
                let patch = ItemPatch::diff(&original, &desired);
                repo.update(id, &patch)?;
            }
            Ok((repo.get_by_id(id)?, duplicate))
        })
        .await?;
    if let Some(item) = item {
        println!("  #{} {} [{}] memo={:?}", item.id, item.name, item.kind, item.memo);
    }
    if let Err(e) = duplicate {
        println!("  Duplicate bookmark rejected: {}", e);
    }
    println!("  ✓ Create + partial update OK");
    println!();
    Ok(())
}

async fn demo_images(store: &Store) -> DemoResult {
    section("Image Repository");
    let latest = store
        .run(|conn| {
            let mut repo = ImageRepository::new(conn);
            repo.create("ph://asset/1")?;
            repo.create("ph://asset/2")?;
            repo.get_latest()
        })
        .await?;
    if let Some(image) = latest {
        println!("  Latest image: {}", image.uri);
    }
    println!("  ✓ Image references OK");
    println!();
    Ok(())
}

async fn demo_bookmark_view(store: &Store) -> DemoResult {
    section("Bookmark View");
    let catalog = StaticCatalog::new(vec![CatalogEntry {
        id: 101,
        name: "Mini Figure Series".to_string(),
        name_kr: Some("미니 피규어 시리즈".to_string()),
        image_link: None,
        price: Some(500),
        media_id: None,
    }]);
    let entries = bookmark_view::load_bookmarks(store, &catalog, BookmarkType::Get, None).await?;
    for entry in &entries {
        let price = entry.catalog.as_ref().and_then(|c| c.price);
        println!("  {} / {} (price {:?})", entry.folder_name, entry.item.name, price);
    }
    let groups = bookmark_view::group_by_gacha(entries);
    println!("  {} gacha group(s)", groups.len());
    println!("  ✓ Folder + catalog merge OK");
    println!();
    Ok(())
}

async fn demo_migration_gate(store: &Store) -> DemoResult {
    section("Startup Migrations");
    let mut flags = MemoryFlagStore::new();
    let first = migration_gate::run_startup_migrations(store, &mut flags).await?;
    let second = migration_gate::run_startup_migrations(store, &mut flags).await?;
    println!("  First start:  {:?}", first);
    println!("  Second start: {:?}", second);
    println!("  ✓ Migration gate OK");
    println!();
    Ok(())
}

fn demo_settings() {
    section("Settings");
    let settings = AppSettings::default();
    println!("  Database file: {}", settings.storage.database_file);
    println!("  Catalog table: {}", settings.catalog.table);
    println!("  Log level:     {}", settings.logging.level);
    println!("  ✓ Defaults OK");
}
