use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::{Bot, Package};
use crate::remote::api::RequestFilePayload;
use crate::remote::{BotDirectory, FileRequestSink};
use crate::types::ClientError;

/// Turns a search hit into a download request on the download manager.
///
/// Bots are looked up by the package's `bot_id` in a list fetched on first
/// use. A miss refreshes the list once before giving up.
pub struct FileRequester {
    bots: Arc<dyn BotDirectory>,
    sink: Arc<dyn FileRequestSink>,
    cache: Mutex<Vec<Bot>>,
}

impl FileRequester {
    pub fn new(bots: Arc<dyn BotDirectory>, sink: Arc<dyn FileRequestSink>) -> Self {
        Self {
            bots,
            sink,
            cache: Mutex::new(Vec::new()),
        }
    }

    pub async fn request_file(&self, package: &Package) -> Result<(), ClientError> {
        let bot = self.resolve_bot(package.bot_id).await?;
        let payload = RequestFilePayload {
            bot_nick: bot.name,
            package_number: package.number,
            file_name: package.name.clone(),
        };
        self.sink.submit_request(&payload).await?;

        info!(
            bot = %payload.bot_nick,
            package = payload.package_number,
            file = %payload.file_name,
            "Requested file"
        );
        Ok(())
    }

    async fn resolve_bot(&self, bot_id: i64) -> Result<Bot, ClientError> {
        let mut cache = self.cache.lock().await;
        if let Some(bot) = cache.iter().find(|bot| bot.id == bot_id) {
            return Ok(bot.clone());
        }

        debug!(bot_id, cached = cache.len(), "Bot not cached, fetching bot list");
        *cache = self.bots.fetch_bots().await?;
        cache
            .iter()
            .find(|bot| bot.id == bot_id)
            .cloned()
            .ok_or(ClientError::BotNotFound(bot_id))
    }
}
