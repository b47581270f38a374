pub mod cache;
pub mod client;

#[allow(unused_imports)]
pub use cache::AssetCache;
#[allow(unused_imports)]
pub use client::{verify_hashes, AssetSource, DownloadItem, DownloadQueue, Downloader};
