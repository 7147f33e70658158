//! docsense - query understanding and relevance scoring for document
//! collections.
//!
//! A free-text request such as "show me the top 3 financial reports from
//! /Finance/Reports" is parsed into a [`QueryIntent`] (quantity, ordering,
//! business categories, folder constraint), every item of a corpus is scored
//! against it, and the survivors are ranked and explained.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use docsense::{Engine, SearchSession, SearchableItem};
//!
//! # async fn run() {
//! let items = vec![
//!     SearchableItem::new("1", "Q4 Budget Analysis")
//!         .with_folder("Finance", "/Finance/Reports")
//!         .with_kind("document"),
//! ];
//!
//! let session = SearchSession::new(Arc::new(Engine::default()));
//! let results = session
//!     .search("top 3 financial reports", &items, None)
//!     .await;
//! for r in results.iter() {
//!     println!("{} ({}%): {}", r.item.name, r.score, r.explanation);
//! }
//! # }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod explain;
pub mod intent;
pub mod item;
pub mod lexical;
pub mod mcp;
pub mod rank;
pub mod scorer;
pub mod search;
pub mod session;
pub mod taxonomy;

pub use config::EngineConfig;
pub use embedding::Embedder;
pub use error::{Error, Result};
pub use intent::QueryIntent;
pub use item::SearchableItem;
pub use search::{Engine, ScoredResult};
pub use session::SearchSession;
pub use taxonomy::Taxonomy;
