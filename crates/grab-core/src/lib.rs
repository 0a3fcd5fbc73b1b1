pub mod config;
pub mod error;
pub mod logging;

pub mod color;
pub mod integrity;
pub mod manifest;
pub mod progress;
pub mod resource;
pub mod retry;
pub mod scheduler;
pub mod storage;
pub mod transfer;

pub use error::{GrabError, MirrorFailure, Result};
pub use integrity::{Algorithm, Integrity};
pub use manifest::{Manifest, TagFilter};
pub use resource::{Artifact, Resource};
pub use scheduler::{download_all, DownloadOptions, DownloadReport, Downloader};
pub use transfer::TransferOptions;
