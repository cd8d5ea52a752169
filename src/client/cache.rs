use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::CacheError;
use crate::message::{self, Message, Messages, NewMessage};

pub const MESSAGES_KEY: &str = "coolichat_messages";

/// String key/value storage that survives restarts.
pub trait LocalStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Keeps every key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> FileStorage {
        FileStorage { dir: dir.into() }
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.item_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.item_path(key), value)
    }
}

/// Message list kept in local storage, independent of the server's store.
#[derive(Debug)]
pub struct MessageCache<S> {
    storage: S,
}

impl<S: LocalStorage> MessageCache<S> {
    pub fn new(storage: S) -> MessageCache<S> {
        MessageCache { storage }
    }

    /// A missing list is empty; a corrupt one is an error.
    pub fn load(&self) -> Result<Messages, CacheError> {
        match self.storage.get_item(MESSAGES_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn append(&mut self, new_message: NewMessage) -> Result<Message, CacheError> {
        let mut messages = self.load()?;
        let id = message::next_id(message::last_id(&messages), message::now());
        let msg = new_message.into_message(id);
        messages.push(msg.clone());
        self.storage
            .set_item(MESSAGES_KEY, &serde_json::to_string(&messages)?)?;
        Ok(msg)
    }
}
