pub mod api;
mod client;
mod core;
mod source;

pub use client::{AnimuxdClient, NiblClient};
pub use source::{BotDirectory, DownloadSource, FileRequestSink, PackageSearch};
