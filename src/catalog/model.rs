use serde::{Deserialize, Serialize};

/// One playable track in the catalog. Identity is `storage_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Object name as listed, e.g. `03 Risk Management.mp3`.
    pub file_name: String,
    /// Full object path inside the bucket, e.g. `CA1 Sound Revision/Disk 2/03 Risk Management.mp3`.
    pub storage_path: String,
    pub public_url: String,
    /// Display name of the group (disk/unit) the track belongs to.
    pub group_label: String,
    /// Leading integer of the file name, when there is one.
    pub sequence_number: Option<u32>,
    pub display_title: String,
}

/// A storage prefix together with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub prefix: String,
    pub label: String,
}

impl GroupSpec {
    /// Build groups from a common `root` folder and group directory names.
    pub fn from_root(root: &str, groups: &[String]) -> Vec<GroupSpec> {
        let root = root.trim().trim_matches('/');
        groups
            .iter()
            .map(|g| g.trim().trim_matches('/'))
            .filter(|g| !g.is_empty())
            .map(|g| GroupSpec {
                prefix: if root.is_empty() {
                    g.to_string()
                } else {
                    format!("{root}/{g}")
                },
                label: g.to_string(),
            })
            .collect()
    }
}

/// One object returned by a listing call. Only the name is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageObject {
    pub name: String,
    /// Folders come back without an id.
    #[serde(default)]
    pub id: Option<String>,
}
