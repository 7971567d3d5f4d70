//! Client-side sync layer for animuxd (downloads) and NIBL (package search).
//!
//! [`SyncHub`] is the entry point: it polls the download manager into a
//! [`Store`] of snapshots, derives aggregates from it, and coordinates
//! searches so only the latest query's response is ever shown.

pub mod config;
pub mod hub;
pub mod models;
pub mod remote;
pub mod store;
pub mod sync;
pub mod types;

pub use config::Config;
pub use hub::{Sources, SyncHub};
pub use models::{Bot, Download, DownloadStatus, Package, Snapshot};
pub use store::{Store, SubscriptionId};
pub use sync::{DownloadSummary, SearchState};
pub use types::ClientError;
