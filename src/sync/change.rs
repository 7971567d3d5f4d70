use crate::models::Download;

/// Sorts a fetched list so backend ordering jitter is invisible to
/// [`snapshots_equal`]. File names may repeat, so ties are broken on the
/// remaining fields and the result is a total order.
pub fn canonicalize(mut downloads: Vec<Download>) -> Vec<Download> {
    downloads.sort_by(|a, b| {
        a.file_name
            .cmp(&b.file_name)
            .then_with(|| sort_key(a).cmp(&sort_key(b)))
    });
    downloads
}

fn sort_key(download: &Download) -> (u8, u64, u64, u64, u64) {
    (
        u8::from(download.status),
        download.current_speed,
        download.avg_speed,
        download.downloaded,
        download.size,
    )
}

/// Field-wise structural equality of two download lists.
pub fn snapshots_equal(a: &[Download], b: &[Download]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(left, right)| left == right)
}
