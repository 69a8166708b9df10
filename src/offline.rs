//! Offline cache for the dashboard's static assets.
//!
//! `install` pre-caches the app shell, `activate` drops stores of previous
//! versions, then `fetch` serves each request according to its route:
//! pass-through for the feed host, cache-first for fonts and icons,
//! stale-while-revalidate for everything else.

pub mod network;
pub mod store;
pub mod worker;

pub use network::{AssetNetwork, AssetResponse, HttpNetwork};
pub use store::CacheStorage;
pub use worker::{AssetWorker, FetchOutcome, Lifecycle, Route, RoutingRules};
