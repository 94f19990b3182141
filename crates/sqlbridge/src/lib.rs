//! # sqlbridge
//!
//! Binds a SQL-aware text editor to a backing form field.
//!
//! The editor is seeded from the field, mirrors every edit back into it and
//! re-synchronizes right before the owning form is submitted. While typing,
//! completions are offered from a table → fields [`Vocabulary`].
//!
//! ```rust
//! use sqlbridge::{init_query_editor, Document, Vocabulary};
//!
//! let mut document = Document::new();
//! let form = document.add_form("query-form");
//! document.add_container("query-editor");
//! let field = document.add_field("query", "query", "SELECT 1", Some(&form));
//!
//! let vocabulary: Vocabulary = [("users", vec!["id", "name"])].into_iter().collect();
//! let editor = init_query_editor(&document, "query-editor", "query", Some(vocabulary)).unwrap();
//!
//! assert_eq!(editor.text(), "SELECT 1");
//! editor.set_text("SELECT * FROM users");
//! assert_eq!(field.value(), "SELECT * FROM users");
//! ```

pub mod app;
pub mod bridge;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod ui;
pub mod vocabulary;

pub use bridge::{init_query_editor, init_query_editor_with_config};
pub use document::{Document, Element, Field, Form, Submission};
pub use error::BridgeError;
pub use ui::{EditorHandle, EditorSurface};
pub use vocabulary::Vocabulary;
