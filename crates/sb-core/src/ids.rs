use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Represents a unique identifier for an attachment embedded in a document.
///
/// Ids are minted once when the attachment enters the document and then
/// travel with it through the package file, so two documents that diverged
/// from the same baseline never reuse an id for different payloads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttachmentId(String);

impl AttachmentId {
    pub fn new() -> Self {
        AttachmentId(Uuid::new_v4().to_string())
    }

    /// Rehydrate an id read back from a package file.
    pub fn from_string(id: String) -> Self {
        AttachmentId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AttachmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
