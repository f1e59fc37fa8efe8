use kiroku::{Permission, RemoteItem};
use serde::{Deserialize, Serialize};

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested for every returned file.
pub const FILE_FIELDS: &str = "id,name,mimeType,parents";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl From<DriveFile> for RemoteItem {
    fn from(file: DriveFile) -> Self {
        Self {
            id: file.id,
            name: file.name,
            parents: file.parents,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPermission<'a> {
    pub r#type: &'a str,
    pub role: &'a str,
    pub email_address: &'a str,
}

impl<'a> From<&'a Permission> for NewPermission<'a> {
    fn from(permission: &'a Permission) -> Self {
        Self {
            r#type: "user",
            role: permission.role.as_str(),
            email_address: &permission.email_address,
        }
    }
}

/// Quote a literal for the `q` parameter of `files.list`.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn folder_query(name: &str) -> String {
    format!(
        "name = {} and mimeType = {} and trashed = false",
        quote(name),
        quote(FOLDER_MIME_TYPE)
    )
}

pub fn children_query(parent_id: &str) -> String {
    format!("{} in parents", quote(parent_id))
}
