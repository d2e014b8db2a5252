use serde::{Deserialize, Serialize};

/// Document formats the editor understands, derived from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Docx,
    Xlsx,
    Pptx,
    Pdf,
    Txt,
}

impl FileType {
    /// `None` for anything the editor cannot open, including names without an
    /// extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;

        match ext.to_ascii_lowercase().as_str() {
            "doc" | "docx" => Some(FileType::Docx),
            "xls" | "xlsx" => Some(FileType::Xlsx),
            "ppt" | "pptx" => Some(FileType::Pptx),
            "pdf" => Some(FileType::Pdf),
            "txt" => Some(FileType::Txt),
            _ => None,
        }
    }

    pub fn document_type(self) -> DocumentType {
        match self {
            FileType::Xlsx => DocumentType::Cell,
            FileType::Pptx => DocumentType::Slide,
            FileType::Docx | FileType::Pdf | FileType::Txt => DocumentType::Word,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Word,
    Cell,
    Slide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    Edit,
    View,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPermissions {
    pub comment: bool,
    pub copy: bool,
    pub download: bool,
    pub edit: bool,
    pub fill_forms: bool,
    pub modify_filter: bool,
    pub modify_content_control: bool,
    pub review: bool,
    pub chat: bool,
    pub protect: bool,
}

impl DocumentPermissions {
    pub fn full() -> Self {
        Self {
            comment: true,
            copy: true,
            download: true,
            edit: true,
            fill_forms: true,
            modify_filter: true,
            modify_content_control: true,
            review: true,
            chat: true,
            protect: true,
        }
    }

    pub fn read_only() -> Self {
        Self {
            comment: false,
            copy: true,
            download: true,
            edit: false,
            fill_forms: false,
            modify_filter: false,
            modify_content_control: false,
            review: false,
            chat: false,
            protect: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    pub file_type: FileType,
    pub key: String,
    pub title: String,
    pub url: String,
    pub permissions: DocumentPermissions,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    pub callback_url: String,
    pub lang: String,
    pub mode: EditorMode,
    pub user: EditorUser,
}

/// Configuration handed to the browser to open the document server editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    pub document: DocumentDescriptor,
    pub document_type: DocumentType,
    pub editor_config: EditorSettings,
    pub height: &'static str,
    pub width: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    Editing,
    ReadyToSave,
    SaveError,
    ClosedUnchanged,
    ForceSaveReady,
    ForceSaveError,
    Unknown(u8),
}

impl From<u8> for CallbackStatus {
    fn from(code: u8) -> Self {
        match code {
            1 => CallbackStatus::Editing,
            2 => CallbackStatus::ReadyToSave,
            3 => CallbackStatus::SaveError,
            4 => CallbackStatus::ClosedUnchanged,
            6 => CallbackStatus::ForceSaveReady,
            7 => CallbackStatus::ForceSaveError,
            other => CallbackStatus::Unknown(other),
        }
    }
}

impl CallbackStatus {
    /// Statuses that carry a download URL for new content.
    pub fn carries_content(self) -> bool {
        matches!(self, CallbackStatus::ReadyToSave | CallbackStatus::ForceSaveReady)
    }
}

/// Body the document server posts to the callback URL.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveCallback {
    #[serde(default)]
    pub key: String,
    pub status: u8,
    pub url: Option<String>,
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackReply {
    pub error: u8,
}

impl CallbackReply {
    pub fn ack() -> Self {
        Self { error: 0 }
    }

    pub fn failed() -> Self {
        Self { error: 1 }
    }
}
