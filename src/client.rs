//! Local side of the chat: a message list persisted on this machine and the
//! composer that feeds it. Nothing here talks to the server.

pub mod cache;
pub mod composer;
