// Deckodecko repositories
// Repositories borrow the shared connection and own all SQL for their table.

pub mod folder_repository;
pub mod image_repository;
pub mod item_repository;
