use fievar::Fields;
use serde::{Deserialize, Serialize};

pub const FOLDER: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize, Fields)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "mimeType", default)]
    #[fievar(name = "mimeType")]
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
}

impl DriveFile {
    #[cfg(test)]
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER
    }

    pub fn parents(&self) -> &[String] {
        self.parents.as_deref().unwrap_or_default()
    }
}
