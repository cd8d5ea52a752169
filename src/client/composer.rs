use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::client::cache::{LocalStorage, MessageCache};
use crate::error::ComposerError;
use crate::message::{self, Attachment, Message, NewMessage};
use crate::render;

pub const MAX_TEXT_CHARS: usize = 500;
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

const WARNING_CHARS: usize = 400;
const DANGER_CHARS: usize = 450;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharCountLevel {
    Normal,
    Warning,
    Danger,
    OverLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    pub count: usize,
    pub level: CharCountLevel,
}

impl CharCount {
    fn of(text: &str) -> CharCount {
        // UTF-16 code units, the unit browser text fields count in.
        let count = text.encode_utf16().count();
        let level = if count > MAX_TEXT_CHARS {
            CharCountLevel::OverLimit
        } else if count > DANGER_CHARS {
            CharCountLevel::Danger
        } else if count > WARNING_CHARS {
            CharCountLevel::Warning
        } else {
            CharCountLevel::Normal
        };
        CharCount { count, level }
    }
}

impl fmt::Display for CharCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, MAX_TEXT_CHARS)
    }
}

/// A file picked for sending. Its content is only read on submit.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFile {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

impl PendingFile {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<PendingFile> {
        let path = path.into();
        let metadata = fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_type_for(&path);
        Ok(PendingFile {
            path,
            name,
            mime_type,
            size: metadata.len(),
        })
    }

    pub fn preview(&self) -> String {
        format!("{} {}", render::attachment_icon(&self.mime_type), self.name)
    }

    fn read(&self) -> io::Result<Attachment> {
        let bytes = fs::read(&self.path)?;
        Ok(Attachment::from_bytes(&self.name, &self.mime_type, &bytes))
    }
}

/// MIME type guessed from the file extension; empty when unknown.
pub fn mime_type_for(path: &Path) -> String {
    let ext = match path.extension() {
        Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
        None => return String::new(),
    };
    let mime = actix_files::file_extension_to_mime(&ext);
    match mime.essence_str() {
        "application/octet-stream" => String::new(),
        essence => essence.to_string(),
    }
}

/// Pending text plus at most one pending file.
#[derive(Debug, Default)]
pub struct Composer {
    text: String,
    file: Option<PendingFile>,
}

impl Composer {
    pub fn new() -> Composer {
        Composer::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn char_count(&self) -> CharCount {
        CharCount::of(&self.text)
    }

    pub fn is_over_limit(&self) -> bool {
        self.char_count().level == CharCountLevel::OverLimit
    }

    pub fn pending_file(&self) -> Option<&PendingFile> {
        self.file.as_ref()
    }

    /// Rejects files over the size limit and leaves the pending file as it was.
    pub fn attach(&mut self, file: PendingFile) -> Result<(), ComposerError> {
        if file.size > MAX_FILE_BYTES {
            return Err(ComposerError::FileTooLarge {
                name: file.name,
                size: file.size,
                limit: MAX_FILE_BYTES,
            });
        }
        self.file = Some(file);
        Ok(())
    }

    pub fn remove_file(&mut self) {
        self.file = None;
    }

    /// Turns the pending input into a stored message and clears the composer.
    /// Returns `Ok(None)` when there is nothing to send.
    pub fn submit<S: LocalStorage>(
        &mut self,
        cache: &mut MessageCache<S>,
    ) -> Result<Option<Message>, ComposerError> {
        if self.text.trim().is_empty() && self.file.is_none() {
            return Ok(None);
        }
        let file = match &self.file {
            Some(pending) => Some(pending.read()?),
            None => None,
        };
        let new_message = match NewMessage::new(&self.text, file, message::now()) {
            Some(m) => m,
            None => return Ok(None),
        };
        let msg = cache.append(new_message)?;

        self.text.clear();
        self.remove_file();
        Ok(Some(msg))
    }
}
