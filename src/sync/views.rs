use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::models::{Download, DownloadStatus, Snapshot};
use crate::store::{Store, SubscriptionId};

/// Aggregates derived from one published snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    /// Sum of current speeds in bytes per second.
    pub total_current_speed: u64,
    pub downloading: Vec<Download>,
    pub waiting: Vec<Download>,
    pub done_count: usize,
    pub failed_count: usize,
}

impl DownloadSummary {
    pub fn from_snapshot(snapshot: &[Download]) -> Self {
        let mut summary = Self::default();
        for download in snapshot {
            summary.total_current_speed = summary
                .total_current_speed
                .saturating_add(download.current_speed);
            match download.status {
                DownloadStatus::Downloading => summary.downloading.push(download.clone()),
                DownloadStatus::Waiting => summary.waiting.push(download.clone()),
                DownloadStatus::Done => summary.done_count += 1,
                DownloadStatus::Failed => summary.failed_count += 1,
            }
        }
        summary
    }
}

type SummaryCache = Mutex<Option<(Arc<Snapshot>, Arc<DownloadSummary>)>>;

/// Read-only projections of the download snapshot, recomputed lazily and
/// only when a new snapshot has been published.
pub struct DownloadViews {
    snapshot: Store<Snapshot>,
    cache: Arc<SummaryCache>,
}

impl DownloadViews {
    pub fn new(snapshot: Store<Snapshot>) -> Self {
        Self {
            snapshot,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub fn summary(&self) -> Arc<DownloadSummary> {
        cached_summary(&self.cache, &self.snapshot.get())
    }

    pub fn total_current_speed(&self) -> u64 {
        self.summary().total_current_speed
    }

    pub fn downloading(&self) -> Vec<Download> {
        self.summary().downloading.clone()
    }

    pub fn waiting(&self) -> Vec<Download> {
        self.summary().waiting.clone()
    }

    /// Calls `f` with fresh aggregates after every snapshot publish.
    pub fn subscribe<F>(&self, f: F) -> SubscriptionId
    where
        F: Fn(&Arc<DownloadSummary>) + Send + Sync + 'static,
    {
        let cache = Arc::clone(&self.cache);
        self.snapshot.subscribe(move |snapshot: &Arc<Snapshot>| {
            f(&cached_summary(&cache, snapshot));
        })
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.snapshot.unsubscribe(id)
    }
}

// Every publish allocates a fresh snapshot, so pointer identity tells us
// whether the cached summary is still current. Holding the Arc keeps the
// address from being reused.
fn cached_summary(cache: &SummaryCache, snapshot: &Arc<Snapshot>) -> Arc<DownloadSummary> {
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some((cached_snapshot, summary)) = cache.as_ref() {
        if Arc::ptr_eq(cached_snapshot, snapshot) {
            return Arc::clone(summary);
        }
    }
    let summary = Arc::new(DownloadSummary::from_snapshot(snapshot));
    *cache = Some((Arc::clone(snapshot), Arc::clone(&summary)));
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn download(name: &str, status: DownloadStatus, current_speed: u64) -> Download {
        Download {
            file_name: name.to_string(),
            status,
            current_speed,
            avg_speed: 0,
            downloaded: 0,
            size: 2048,
        }
    }

    #[test]
    fn empty_snapshot_has_zero_speed() {
        let views = DownloadViews::new(Store::default());
        assert_eq!(views.total_current_speed(), 0);
        assert!(views.downloading().is_empty());
        assert!(views.waiting().is_empty());
    }

    #[test]
    fn sums_speed_and_partitions_by_status() {
        let store = Store::default();
        store.set(vec![
            download("bar.mkv", DownloadStatus::Waiting, 0),
            download("foo.mkv", DownloadStatus::Downloading, 10 * 1024 * 1024),
        ]);
        let views = DownloadViews::new(store.clone());

        assert_eq!(views.total_current_speed(), 10 * 1024 * 1024);
        let downloading = views.downloading();
        let waiting = views.waiting();
        assert_eq!(downloading.len(), 1);
        assert_eq!(waiting.len(), 1);
        assert!(downloading.iter().all(|d| !waiting.contains(d)));
        assert_eq!(downloading.len() + waiting.len(), store.get().len());
    }

    #[test]
    fn filtered_views_keep_snapshot_order() {
        let store = Store::default();
        store.set(vec![
            download("a.mkv", DownloadStatus::Downloading, 1),
            download("b.mkv", DownloadStatus::Done, 0),
            download("c.mkv", DownloadStatus::Downloading, 2),
            download("d.mkv", DownloadStatus::Failed, 0),
        ]);
        let summary = DownloadViews::new(store).summary();

        let names: Vec<&str> = summary
            .downloading
            .iter()
            .map(|d| d.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.mkv", "c.mkv"]);
        assert_eq!(summary.done_count, 1);
        assert_eq!(summary.failed_count, 1);
    }

    #[test]
    fn recomputes_only_when_snapshot_changes() {
        let store = Store::default();
        store.set(vec![download("a.mkv", DownloadStatus::Downloading, 3)]);
        let views = DownloadViews::new(store.clone());

        let first = views.summary();
        let again = views.summary();
        assert!(Arc::ptr_eq(&first, &again));

        store.set(vec![download("a.mkv", DownloadStatus::Downloading, 4)]);
        let fresh = views.summary();
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert_eq!(fresh.total_current_speed, 4);
    }

    #[test]
    fn subscribers_receive_aggregates_per_publish() {
        let store = Store::default();
        let views = DownloadViews::new(store.clone());
        let speeds = Arc::new(Mutex::new(Vec::new()));
        {
            let speeds = Arc::clone(&speeds);
            views.subscribe(move |summary| {
                speeds.lock().unwrap().push(summary.total_current_speed);
            });
        }

        store.set(vec![download("a.mkv", DownloadStatus::Downloading, 7)]);
        store.set(Vec::new());

        assert_eq!(*speeds.lock().unwrap(), vec![7, 0]);
        assert_eq!(views.total_current_speed(), 0);
    }
}
