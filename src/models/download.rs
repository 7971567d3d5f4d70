use std::fmt;

use serde::{Deserialize, Serialize};

/// The canonically ordered download list published by the sync engine.
pub type Snapshot = Vec<Download>;

/// Transfer state as reported by animuxd (encoded as an integer on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DownloadStatus {
    Waiting,
    Downloading,
    Done,
    Failed,
}

impl TryFrom<u8> for DownloadStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DownloadStatus::Waiting),
            1 => Ok(DownloadStatus::Downloading),
            2 => Ok(DownloadStatus::Done),
            3 => Ok(DownloadStatus::Failed),
            other => Err(format!("unknown download status {other}")),
        }
    }
}

impl From<DownloadStatus> for u8 {
    fn from(status: DownloadStatus) -> Self {
        match status {
            DownloadStatus::Waiting => 0,
            DownloadStatus::Downloading => 1,
            DownloadStatus::Done => 2,
            DownloadStatus::Failed => 3,
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DownloadStatus::Waiting => "Waiting",
            DownloadStatus::Downloading => "Downloading",
            DownloadStatus::Done => "Done",
            DownloadStatus::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// One transfer known to the download manager. Speeds are bytes per second.
///
/// Decoding rejects records claiming more bytes downloaded than the file size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", try_from = "RawDownload")]
pub struct Download {
    pub file_name: String,
    pub status: DownloadStatus,
    pub current_speed: u64,
    pub avg_speed: u64,
    pub downloaded: u64,
    pub size: u64,
}

/// Wire shape of [`Download`] before validation.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDownload {
    file_name: String,
    status: DownloadStatus,
    current_speed: u64,
    avg_speed: u64,
    downloaded: u64,
    size: u64,
}

impl TryFrom<RawDownload> for Download {
    type Error = String;

    fn try_from(raw: RawDownload) -> Result<Self, Self::Error> {
        if raw.downloaded > raw.size {
            return Err(format!(
                "{}: downloaded {} exceeds size {}",
                raw.file_name, raw.downloaded, raw.size
            ));
        }
        Ok(Download {
            file_name: raw.file_name,
            status: raw.status,
            current_speed: raw.current_speed,
            avg_speed: raw.avg_speed,
            downloaded: raw.downloaded,
            size: raw.size,
        })
    }
}

impl Download {
    /// Percentage of `size` already received, 0 when the size is unknown.
    pub fn progress_percent(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        self.downloaded as f64 / self.size as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_animuxd_record() {
        let raw = r#"{
            "FileName": "foo.mkv",
            "Status": 1,
            "CurrentSpeed": 10485760,
            "AvgSpeed": 3145728,
            "Downloaded": 536870912,
            "Size": 1073741824
        }"#;
        let download: Download = serde_json::from_str(raw).unwrap();
        assert_eq!(download.file_name, "foo.mkv");
        assert_eq!(download.status, DownloadStatus::Downloading);
        assert_eq!(download.current_speed, 10 * 1024 * 1024);
        assert_eq!(download.progress_percent(), 50.0);
    }

    #[test]
    fn rejects_unknown_status() {
        let raw = r#"{"FileName":"x","Status":9,"CurrentSpeed":0,"AvgSpeed":0,"Downloaded":0,"Size":0}"#;
        assert!(serde_json::from_str::<Download>(raw).is_err());
    }

    #[test]
    fn rejects_downloaded_beyond_size() {
        let raw = r#"{"FileName":"x","Status":1,"CurrentSpeed":0,"AvgSpeed":0,"Downloaded":2049,"Size":2048}"#;
        let err = serde_json::from_str::<Download>(raw).unwrap_err();
        assert!(err.to_string().contains("exceeds size"));

        let complete = r#"{"FileName":"x","Status":2,"CurrentSpeed":0,"AvgSpeed":0,"Downloaded":2048,"Size":2048}"#;
        let download: Download = serde_json::from_str(complete).unwrap();
        assert_eq!(download.progress_percent(), 100.0);
    }

    #[test]
    fn status_labels_match_table_text() {
        assert_eq!(DownloadStatus::Waiting.to_string(), "Waiting");
        assert_eq!(DownloadStatus::Failed.to_string(), "Failed");
    }

    #[test]
    fn progress_of_empty_file_is_zero() {
        let download = Download {
            file_name: "empty".to_string(),
            status: DownloadStatus::Waiting,
            current_speed: 0,
            avg_speed: 0,
            downloaded: 0,
            size: 0,
        };
        assert_eq!(download.progress_percent(), 0.0);
    }
}
