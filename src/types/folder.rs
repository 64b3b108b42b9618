use serde::{Deserialize, Serialize};

/// Id of the folder seeded on first bootstrap.
pub const DEFAULT_FOLDER_ID: i64 = 1;

/// Name given to the seeded default folder.
pub const DEFAULT_FOLDER_NAME: &str = "기본 폴더";

/// A user-named, ordered bucket of bookmarked items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub sequence: i64,
    pub name: String,
    pub created_at: String,
}

impl Folder {
    /// True for the seeded default folder.
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_FOLDER_ID
    }
}
