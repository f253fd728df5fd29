use serde::{Deserialize, Serialize};

pub mod delete;
pub mod selection;
pub mod settings;
pub mod upload;

/// Reply body of `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadReply {
    pub ok: bool,
    #[serde(default)]
    pub saved: Option<u32>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Reply body of `GET /settings/storage`: the server's canonical byte counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    pub quota_bytes: u64,
    pub max_file_bytes: u64,
}

/// Reply body shared by `POST /settings/storage` and `POST /files/{id}/delete`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionReply {
    pub ok: bool,
    #[serde(default)]
    pub msg: Option<String>,
}

/// One entry of the server-rendered file listing embedded in the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileEntry {
    pub id: u64,
    pub name: String,
    pub size_bytes: u64,
}

/// Outcome of one HTTP exchange, before any component interprets it.
///
/// `body` is `None` when the response body could not be parsed as `B`;
/// components treat that as a failure payload, never as a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpOutcome<B> {
    /// No response was received at all.
    NetworkError,
    Response { status: u16, body: Option<B> },
}

#[cfg(feature = "frontend")]
pub mod frontend;

#[cfg(feature = "frontend")]
pub use frontend::*;
