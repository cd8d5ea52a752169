use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::message::{self, Message, Messages, NewMessage};

/// Server side owner of the message list and of the JSON file backing it.
///
/// The file is rewritten in full after every append. Nothing guards against
/// another process writing the same file.
#[derive(Debug)]
pub struct MessageStore {
    path: PathBuf,
    messages: Messages,
}

impl MessageStore {
    /// Reads `path` if it exists. An unreadable or corrupt file is logged and
    /// treated as an empty list.
    pub fn load(path: impl Into<PathBuf>) -> MessageStore {
        let path = path.into();
        let messages = if path.is_file() {
            match read_messages(&path) {
                Ok(messages) => {
                    log::info!("Loaded {} messages from {}", messages.len(), path.display());
                    messages
                }
                Err(e) => {
                    log::error!("Error reading messages file {}: {}", path.display(), e);
                    Vec::new()
                }
            }
        } else {
            log::info!("No messages file at {}, starting empty", path.display());
            Vec::new()
        };
        MessageStore { path, messages }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[Message] {
        &self.messages
    }

    pub fn append(&mut self, text: &str) -> Result<Message, StoreError> {
        let timestamp = message::now();
        let new_message = NewMessage::new(text, None, timestamp).ok_or(StoreError::EmptyText)?;
        let id = message::next_id(message::last_id(&self.messages), timestamp);
        let msg = new_message.into_message(id);

        self.messages.push(msg.clone());
        if let Err(e) = self.persist() {
            // Keep memory in line with what is on disk.
            self.messages.pop();
            return Err(e);
        }
        log::debug!("Stored message {}", msg.id);
        Ok(msg)
    }

    pub fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(&self.messages)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn read_messages(path: &Path) -> Result<Messages, StoreError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
