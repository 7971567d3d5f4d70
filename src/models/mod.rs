mod download;
mod package;
mod timestamp;

pub use download::{Download, DownloadStatus, Snapshot};
pub use package::{Bot, Package};
