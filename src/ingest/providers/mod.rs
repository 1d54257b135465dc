// src/ingest/providers/mod.rs
pub mod dev_to;
pub mod hacker_news;

pub use dev_to::DevToProvider;
pub use hacker_news::HackerNewsProvider;
