mod change;
mod downloads;
mod requests;
mod search;
mod views;

pub use change::{canonicalize, snapshots_equal};
pub use downloads::{DownloadSync, DownloadSyncHandle};
pub use requests::FileRequester;
pub use search::{SearchCoordinator, SearchState};
pub use views::{DownloadSummary, DownloadViews};
