use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use animux_client::remote::api::RequestFilePayload;
use animux_client::remote::{BotDirectory, DownloadSource, FileRequestSink, PackageSearch};
use animux_client::{
    Bot, ClientError, Download, DownloadStatus, Package, SearchState, Sources, SyncHub,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::time;

/// Backend where each search query answers after its own latency.
struct Backend {
    polls: AtomicUsize,
    latency_ms: HashMap<&'static str, u64>,
    posted: Mutex<Vec<RequestFilePayload>>,
}

#[async_trait]
impl DownloadSource for Backend {
    async fn fetch_downloads(&self) -> Result<Vec<Download>, ClientError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            Download {
                file_name: "foo.mkv".to_string(),
                status: DownloadStatus::Downloading,
                current_speed: 10 * 1024 * 1024,
                avg_speed: 3 * 1024 * 1024,
                downloaded: 512 * 1024 * 1024,
                size: 1024 * 1024 * 1024,
            },
            Download {
                file_name: "bar.mkv".to_string(),
                status: DownloadStatus::Waiting,
                current_speed: 0,
                avg_speed: 0,
                downloaded: 0,
                size: 2048 * 1024 * 1024,
            },
        ])
    }
}

#[async_trait]
impl PackageSearch for Backend {
    async fn search_packages(&self, query: &str) -> Result<Vec<Package>, ClientError> {
        let latency = self.latency_ms.get(query).copied().unwrap_or(0);
        time::sleep(Duration::from_millis(latency)).await;
        Ok(vec![Package {
            bot_id: 1,
            number: 1337,
            name: format!("{query} 01"),
            size: "100M".to_string(),
            size_kbits: 102400,
            episode_number: 1,
            last_modified: NaiveDate::from_ymd_opt(2020, 2, 20)
                .unwrap()
                .and_hms_opt(21, 37, 0)
                .unwrap(),
        }])
    }
}

#[async_trait]
impl BotDirectory for Backend {
    async fn fetch_bots(&self) -> Result<Vec<Bot>, ClientError> {
        Ok(vec![Bot {
            id: 1,
            name: "fo0b0t".to_string(),
            owner: "baz".to_string(),
            last_processed: NaiveDate::from_ymd_opt(2020, 2, 20)
                .unwrap()
                .and_hms_opt(21, 37, 0)
                .unwrap(),
            batch_enable: 1,
            pack_size: 1337,
        }])
    }
}

#[async_trait]
impl FileRequestSink for Backend {
    async fn submit_request(&self, payload: &RequestFilePayload) -> Result<(), ClientError> {
        self.posted.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

fn hub() -> (Arc<Backend>, SyncHub) {
    let backend = Arc::new(Backend {
        polls: AtomicUsize::new(0),
        latency_ms: HashMap::from([("f", 500), ("foo", 100)]),
        posted: Mutex::new(Vec::new()),
    });
    let sources = Sources {
        downloads: backend.clone(),
        search: backend.clone(),
        bots: backend.clone(),
        requests: backend.clone(),
    };
    (backend, SyncHub::with_sources(sources, Duration::from_millis(1000)))
}

async fn advance(ms: u64) {
    time::advance(Duration::from_millis(ms)).await;
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn steady_backend_publishes_once_and_aggregates() {
    let (backend, mut hub) = hub();
    hub.activate_downloads();
    advance(0).await;

    for _ in 0..3 {
        advance(1000).await;
    }
    assert_eq!(backend.polls.load(Ordering::SeqCst), 4);
    assert_eq!(hub.downloads().version(), 1);

    let names: Vec<String> = hub
        .downloads()
        .get()
        .iter()
        .map(|d| d.file_name.clone())
        .collect();
    assert_eq!(names, vec!["bar.mkv", "foo.mkv"]);
    assert_eq!(hub.views().total_current_speed(), 10 * 1024 * 1024);
    assert_eq!(hub.views().downloading()[0].file_name, "foo.mkv");
    assert_eq!(hub.views().waiting()[0].file_name, "bar.mkv");

    hub.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn last_submitted_query_wins_end_to_end() {
    let (_, hub) = hub();
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    {
        let seen = Arc::clone(&seen);
        hub.search_state().subscribe(move |state: &Arc<SearchState>| {
            if !state.loading {
                seen.lock().unwrap().push(state.query.clone());
            }
        });
    }

    assert!(hub.search().submit("f").unwrap());
    assert!(hub.search().submit("foo").unwrap());
    advance(0).await;
    advance(100).await;
    advance(400).await;

    let state = hub.search().current_state();
    assert_eq!(state.query, "foo");
    assert_eq!(state.results[0].name, "foo 01");
    assert_eq!(*seen.lock().unwrap(), vec!["foo".to_string()]);

    hub.shutdown().await;
}

#[tokio::test]
async fn requesting_a_search_hit_posts_to_download_manager() {
    let (backend, hub) = hub();
    let package = backend.search_packages("foo").await.unwrap().remove(0);

    hub.request_file(&package).await.unwrap();

    let posted = backend.posted.lock().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].bot_nick, "fo0b0t");
    assert_eq!(posted[0].package_number, 1337);
}
