//! # Lightflow client for Rust
//!
//! Typed async client for the Lightflow video processing API: submit assets
//! for transcoding, manage the storage locations workflows read from and
//! write to, and fetch playback manifests for processed assets.
//!
//! ## Quick start
//!
//! ```no_run
//! use lightflow::Client;
//!
//! #[tokio::main]
//! async fn main() -> lightflow::Result<()> {
//!     let client = Client::new("https://api.example.com/v1", "my-token");
//!
//!     let page = client.list_assets().await?;
//!     for asset in &page.items {
//!         println!("{:?} {}", asset.uuid, asset.parameters.input.url_path);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`LightflowError`]. Nothing is retried: transport
//! failures, error statuses, unexpected success statuses and undecodable
//! bodies all come back to the caller, and the client stays usable.
//!
//! Logging goes through [`tracing`]; install a subscriber to see requests.

mod client;
mod errors;
mod models;

pub use client::{Client, ClientBuilder};
pub use errors::{LightflowError, Result};
pub use models::{
    Asset, AssetCallback, AssetInfo, AssetPage, AssetParameters, AudioStream, CallbackHeader,
    CallbackMethod, CallbackSource, CallbackType, Codec, Fairplay, InputParameters, LicenseUrl,
    MaxFps, OutputParameters, Paginated, PerceptualAudioParams, PerceptualOptionParams,
    PerceptualQualityParams, PlaybackInfo, PlaybackManifest, PlaybackManifestType, Protection,
    Rendition, SubtitleStream, VideoStream, WorkflowStorage, WorkflowStorageArgument,
    WorkflowStoragePage, WorkflowStorageResponse,
};

pub use reqwest::Method;
