//! SQLite storage for the Devrang engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
