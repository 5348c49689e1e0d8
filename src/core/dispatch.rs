// src/core/dispatch.rs

//! # Dispatch Selector
//!
//! Pure decision logic mapping a file's extension and MIME type to the kind of
//! application that should open it. The extension decides first; the MIME type is
//! consulted only when the extension is unknown or when an extension-less file needs
//! confirmation that it really is text. `None` means "use the fallback opener".

use crate::models::AppId;
use lazy_static::lazy_static;
use std::{collections::HashMap, path::Path};

const PDF_EXTENSIONS: &[&str] = &["pdf"];
const DOCUMENT_EXTENSIONS: &[&str] = &["docx", "doc", "odt", "rtf"];
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "tiff", "tif", "ico", "heic", "avif",
];
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "webm", "avi", "mov", "flv", "wmv", "m4v", "mp3", "flac", "wav", "ogg", "opus",
    "m4a", "aac",
];
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "ods", "csv"];
const WEB_EXTENSIONS: &[&str] = &["html", "htm", "xhtml"];
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "rst", "log", "json", "yaml", "yml", "toml", "ini", "conf", "cfg", "env", "xml",
    "rs", "go", "py", "js", "ts", "jsx", "tsx", "c", "h", "cpp", "hpp", "cc", "java", "kt", "lua",
    "rb", "php", "pl", "sh", "bash", "zsh", "fish", "css", "scss", "sql", "vim", "tex", "diff",
    "patch", "gitignore", "lock",
];

/// Application MIME types that are really text.
const TEXT_LIKE_MIMES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
    "application/x-sh",
    "application/x-shellscript",
    "application/x-yaml",
    "application/toml",
    "application/x-empty",
    "inode/x-empty",
];
const DOCUMENT_MIMES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.oasis.opendocument.text",
    "application/rtf",
];
const SPREADSHEET_MIMES: &[&str] = &[
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.oasis.opendocument.spreadsheet",
];

lazy_static! {
    static ref BUILTIN_TABLE: AssociationTable = AssociationTable::builtin_uncached();
}

/// What the extension alone says about a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionVerdict {
    /// The extension decides on its own; no MIME lookup is needed.
    App(AppId),
    /// No extension: treat as text only if the MIME type agrees.
    TextIfMimeAllows,
    /// Unknown extension: the MIME table must decide.
    NoMatch,
}

/// The immutable extension and MIME association tables.
#[derive(Debug)]
pub struct AssociationTable {
    extensions: HashMap<&'static str, AppId>,
}

impl AssociationTable {
    /// The compiled-in table, built once on first use.
    pub fn builtin() -> &'static Self {
        &BUILTIN_TABLE
    }

    fn builtin_uncached() -> Self {
        let groups: [(&[&str], AppId); 7] = [
            (PDF_EXTENSIONS, AppId::PdfViewer),
            (DOCUMENT_EXTENSIONS, AppId::DocxViewer),
            (IMAGE_EXTENSIONS, AppId::ImageViewer),
            (MEDIA_EXTENSIONS, AppId::VideoPlayer),
            (SPREADSHEET_EXTENSIONS, AppId::SpreadsheetEditor),
            (WEB_EXTENSIONS, AppId::WebBrowser),
            (TEXT_EXTENSIONS, AppId::TextEditor),
        ];

        let extensions = groups
            .iter()
            .flat_map(|(exts, app)| exts.iter().map(move |ext| (*ext, *app)))
            .collect();

        Self { extensions }
    }

    /// Classifies a normalized (lowercase, dot-less) extension.
    pub fn by_extension(&self, extension: &str) -> ExtensionVerdict {
        if extension.is_empty() {
            return ExtensionVerdict::TextIfMimeAllows;
        }
        match self.extensions.get(extension) {
            Some(app) => ExtensionVerdict::App(*app),
            None => ExtensionVerdict::NoMatch,
        }
    }

    /// The MIME-based table, consulted after the extension table declines.
    pub fn by_mime(&self, mime: &str) -> Option<AppId> {
        if is_text_like(mime) {
            return Some(AppId::TextEditor);
        }
        if mime.starts_with("image/") {
            return Some(AppId::ImageViewer);
        }
        if mime.starts_with("video/") || mime.starts_with("audio/") {
            return Some(AppId::VideoPlayer);
        }
        if mime == "application/pdf" {
            return Some(AppId::PdfViewer);
        }
        if DOCUMENT_MIMES.contains(&mime) {
            return Some(AppId::DocxViewer);
        }
        if SPREADSHEET_MIMES.contains(&mime) {
            return Some(AppId::SpreadsheetEditor);
        }
        None
    }

    /// Full selection: extension first, then MIME, `None` when the fallback opener is needed.
    pub fn select_app(&self, extension: &str, mime: &str) -> Option<AppId> {
        let extension = normalize_extension(extension);
        match self.by_extension(&extension) {
            ExtensionVerdict::App(app) => Some(app),
            ExtensionVerdict::TextIfMimeAllows if mime.is_empty() || is_text_like(mime) => {
                Some(AppId::TextEditor)
            }
            ExtensionVerdict::TextIfMimeAllows | ExtensionVerdict::NoMatch => self.by_mime(mime),
        }
    }
}

/// `select_app` against the compiled-in table.
pub fn select_app(extension: &str, mime: &str) -> Option<AppId> {
    AssociationTable::builtin().select_app(extension, mime)
}

/// Text-prefixed MIME types and the short list of text-like application types.
pub fn is_text_like(mime: &str) -> bool {
    mime.starts_with("text/") || TEXT_LIKE_MIMES.contains(&mime)
}

/// Lowercases an extension and strips a leading dot.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// The normalized extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(normalize_extension)
        .unwrap_or_default()
}
