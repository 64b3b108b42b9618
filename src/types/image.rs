use serde::{Deserialize, Serialize};

/// A saved reference to a user-picked photo in the device media library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub uri: String,
    pub created_at: String,
}
