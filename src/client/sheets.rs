use chrono::Utc;
use reqwest::Client;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use crate::core::csv::{self, Record};
use crate::error::{BoardError, BoardResult};
use crate::storage::SnapshotStore;

/// Prefix shared by every snapshot key.
pub const SNAPSHOT_PREFIX: &'static str = "kstreet";
const FEED_NAMES: [&'static str; 2] = ["Challenges", "Completions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Challenges,
    Completions,
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Feed::Challenges => write!(f, "{}", FEED_NAMES[0]),
            Feed::Completions => write!(f, "{}", FEED_NAMES[1]),
        }
    }
}

impl Feed {
    /// Key of the stored records for this feed.
    pub fn snapshot_key(&self) -> String {
        format!("{SNAPSHOT_PREFIX}_{self}")
    }

    /// Key of the capture time (epoch milliseconds) for this feed.
    pub fn snapshot_time_key(&self) -> String {
        format!("{SNAPSHOT_PREFIX}_{self}_time")
    }
}

enum Endpoint<'a> {
    CsvExport(&'a str),
}

impl fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endpoint::CsvExport(sheet_id) => {
                write!(f, "/spreadsheets/d/{}/gviz/tq", sheet_id)
            }
        }
    }
}

/// Client for the published spreadsheet, caching each feed in a snapshot store.
pub struct Sheets {
    http_client: Client,
    base_url: String,
    sheet_id: String,
    ttl: Duration,
    store: Arc<dyn SnapshotStore>,
}

impl Sheets {
    pub fn new(
        base_url: String,
        timeout: Duration,
        sheet_id: String,
        ttl: Duration,
        store: Arc<dyn SnapshotStore>,
    ) -> BoardResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sheet_id,
            ttl,
            store,
        })
    }

    /// Records of a feed, from a fresh snapshot when there is one, from the
    /// network otherwise. Network failures are not covered by stale snapshots.
    pub async fn fetch(&self, feed: Feed) -> BoardResult<Vec<Record>> {
        match self.fresh_snapshot(feed) {
            Ok(Some(records)) => {
                debug!("Serving {feed} from snapshot ({} rows)", records.len());
                return Ok(records);
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable {feed} snapshot. {e}"),
        }

        let body = self.get(self.feed_url(feed)?, feed).await?;
        let records = csv::parse(&body);
        info!("Fetched {feed} ({} rows)", records.len());

        if let Err(e) = self.save_snapshot(feed, &records) {
            warn!("Could not store {feed} snapshot. {e}");
        }
        Ok(records)
    }

    /// Feed URL, as requested by `fetch`.
    pub fn feed_url(&self, feed: Feed) -> BoardResult<reqwest::Url> {
        let endpoint = Endpoint::CsvExport(&self.sheet_id);
        let mut url = reqwest::Url::parse(&format!("{}{}", self.base_url, endpoint))
            .map_err(|e| BoardError::Config(format!("Invalid feed url. {e}")))?;
        url.query_pairs_mut()
            .append_pair("tqx", "out:csv")
            .append_pair("sheet", &feed.to_string());
        Ok(url)
    }

    async fn get(&self, url: reqwest::Url, feed: Feed) -> BoardResult<String> {
        let response = self.http_client.get(url).send().await?;

        match response.status() {
            status if status.is_success() => response
                .text()
                .await
                .map_err(|e| BoardError::Parse(format!("{feed} body. {e}"))),
            status => Err(BoardError::Fetch {
                feed: feed.to_string(),
                status,
            }),
        }
    }

    fn fresh_snapshot(&self, feed: Feed) -> BoardResult<Option<Vec<Record>>> {
        let (data, captured_at) = match (
            self.store.get(&feed.snapshot_key())?,
            self.store.get(&feed.snapshot_time_key())?,
        ) {
            (Some(data), Some(time)) if !data.is_empty() && !time.is_empty() => (data, time),
            _ => return Ok(None),
        };

        let captured_at = captured_at
            .trim()
            .parse::<i64>()
            .map_err(|e| BoardError::CacheRead(format!("{feed} capture time. {e}")))?;
        let age_ms = Utc::now().timestamp_millis() - captured_at;
        if age_ms >= self.ttl.as_millis() as i64 {
            debug!("{feed} snapshot expired ({age_ms}ms old)");
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&data)?))
    }

    fn save_snapshot(&self, feed: Feed, records: &[Record]) -> BoardResult<()> {
        let data = serde_json::to_string(records)
            .map_err(|e| BoardError::Storage(e.to_string()))?;
        self.store.set(&feed.snapshot_key(), &data)?;
        self.store
            .set(&feed.snapshot_time_key(), &Utc::now().timestamp_millis().to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn snapshot_keys_are_prefixed_by_feed() {
        assert_eq!(Feed::Challenges.snapshot_key(), "kstreet_Challenges");
        assert_eq!(Feed::Completions.snapshot_time_key(), "kstreet_Completions_time");
    }

    #[test]
    fn feed_url_targets_csv_export() {
        let sheets = Sheets::new(
            "https://docs.google.com/".to_string(),
            Duration::from_secs(5),
            "abc123".to_string(),
            Duration::from_secs(300),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        assert_eq!(
            sheets.feed_url(Feed::Completions).unwrap().as_str(),
            "https://docs.google.com/spreadsheets/d/abc123/gviz/tq?tqx=out%3Acsv&sheet=Completions"
        );
    }
}
