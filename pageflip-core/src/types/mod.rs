//! Core types shared by the wizard, the record service and the API

mod book;
mod category;

pub use book::{Book, NewBook, OwnerId};
pub use category::{Category, UnknownCategory};
