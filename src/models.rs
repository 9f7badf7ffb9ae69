use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::LightflowError;

/// Defines a closed string enum with explicit wire names. Unknown wire
/// values fail deserialization.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// The value as it appears on the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a list endpoint. The client never fetches further pages on
/// its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    #[serde(default)]
    pub total_items: u64,
    /// Zero-based.
    #[serde(default)]
    pub page_index: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Paginated<T> {
    /// `true` if the server reports pages after this one.
    pub fn has_more(&self) -> bool {
        self.page_index.saturating_add(1) < self.pages
    }
}

/// `GET /assets` response.
pub type AssetPage = Paginated<Asset>;

/// `GET /inputs-outputs` response.
pub type WorkflowStoragePage = Paginated<WorkflowStorageResponse>;

// ---------------------------------------------------------------------------
// Workflow storage
// ---------------------------------------------------------------------------

/// Outbound storage location record, sent to `POST /inputs-outputs`.
///
/// Serializes to the same wire shape as [`WorkflowStorageResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStorage {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub storage_id: String,
    #[serde(default)]
    pub storage_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ordered; the server keeps argument order.
    #[serde(default)]
    pub args: Vec<WorkflowStorageArgument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_date: Option<DateTime<Utc>>,
}

impl WorkflowStorage {
    pub fn new(
        name: impl Into<String>,
        storage_type: impl Into<String>,
        storage_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            storage_type: storage_type.into(),
            storage_id: storage_id.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append an argument, keeping insertion order.
    pub fn with_arg(mut self, arg: WorkflowStorageArgument) -> Self {
        self.args.push(arg);
        self
    }

    /// Encode as a JSON string.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(LightflowError::Serialization)
    }
}

/// Storage location record as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStorageResponse {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub storage_id: String,
    #[serde(default)]
    pub storage_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub args: Vec<WorkflowStorageArgument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_date: Option<DateTime<Utc>>,
}

impl WorkflowStorageResponse {
    /// Encode as a JSON string.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(LightflowError::Serialization)
    }
}

impl From<WorkflowStorageResponse> for WorkflowStorage {
    fn from(r: WorkflowStorageResponse) -> Self {
        Self {
            uuid: r.uuid,
            username: r.username,
            account_name: r.account_name,
            creation_date: r.creation_date,
            storage_id: r.storage_id,
            storage_type: r.storage_type,
            name: r.name,
            label: r.label,
            args: r.args,
            remove_date: r.remove_date,
        }
    }
}

impl From<WorkflowStorage> for WorkflowStorageResponse {
    fn from(s: WorkflowStorage) -> Self {
        Self {
            uuid: s.uuid,
            username: s.username,
            account_name: s.account_name,
            creation_date: s.creation_date,
            storage_id: s.storage_id,
            storage_type: s.storage_type,
            name: s.name,
            label: s.label,
            args: s.args,
            remove_date: s.remove_date,
        }
    }
}

/// Typed key/value argument of a storage location (bucket, credentials, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStorageArgument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Server-defined type tag, e.g. "string".
    #[serde(rename = "type", default)]
    pub arg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl WorkflowStorageArgument {
    pub fn new(id: impl Into<String>, arg_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            arg_type: arg_type.into(),
            value: Some(value.into()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// A unit of media submitted for processing.
///
/// Only `parameters.input.url_path` is needed to create an asset; every other
/// top-level field is filled in by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Server-side processing stage, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub parameters: AssetParameters,
    #[serde(default)]
    pub callbacks: Vec<AssetCallback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_manifests: Option<Vec<PlaybackManifest>>,
    /// Media metadata, present once the server has probed the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_info: Option<AssetInfo>,
}

impl Asset {
    /// Minimal outbound asset reading from `url_path`.
    pub fn new(url_path: impl Into<String>) -> Self {
        Self {
            parameters: AssetParameters {
                input: InputParameters {
                    id: None,
                    url_path: url_path.into(),
                },
                ..AssetParameters::default()
            },
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_output(mut self, output: OutputParameters) -> Self {
        self.parameters.output = Some(output);
        self
    }

    pub fn with_perceptual_quality(mut self, params: PerceptualQualityParams) -> Self {
        self.parameters.perceptual_quality = Some(params);
        self
    }

    pub fn with_callback(mut self, callback: AssetCallback) -> Self {
        self.callbacks.push(callback);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetParameters {
    pub input: InputParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputParameters>,
    #[serde(
        rename = "perceptual-quality",
        skip_serializing_if = "Option::is_none"
    )]
    pub perceptual_quality: Option<PerceptualQualityParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputParameters {
    /// Workflow storage the input is read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url_path: String,
}

/// Where processed output is written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Perceptual quality encoding
// ---------------------------------------------------------------------------

/// Encoder family plus per-codec tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerceptualQualityParams {
    #[serde(default)]
    pub encoder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_preparation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h264: Option<PerceptualOptionParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h265: Option<PerceptualOptionParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aac: Option<PerceptualAudioParams>,
}

impl PerceptualQualityParams {
    /// Encoder value used when the server picks the encoder itself.
    pub const DEFAULT_ENCODER: &'static str = "none";

    /// H264-only profile with the server-selected encoder.
    pub fn h264(params: PerceptualOptionParams) -> Self {
        Self {
            encoder: Self::DEFAULT_ENCODER.to_string(),
            h264: Some(params),
            ..Self::default()
        }
    }
}

/// Video tuning for H264/H265.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerceptualOptionParams {
    #[serde(default)]
    pub max_bitrate: u32,
    #[serde(default)]
    pub min_bitrate: u32,
    /// Vertical resolution cap, e.g. 1080.
    #[serde(default)]
    pub max_resolution: u32,
    #[serde(default)]
    pub complexity_peaks_awareness: u32,
    #[serde(
        rename = "maxFPS",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub max_fps: Option<MaxFps>,
    #[serde(default)]
    pub target_quality: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerceptualAudioParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

const AUTO_FPS: &str = "auto";

/// Frame rate cap: a fixed integer, or `"auto"` to let the encoder decide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MaxFps {
    Fixed(u32),
    #[default]
    Auto,
}

impl From<u32> for MaxFps {
    fn from(fps: u32) -> Self {
        Self::Fixed(fps)
    }
}

impl fmt::Display for MaxFps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(fps) => write!(f, "{fps}"),
            Self::Auto => f.write_str(AUTO_FPS),
        }
    }
}

impl Serialize for MaxFps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Fixed(fps) => serializer.serialize_u32(*fps),
            Self::Auto => serializer.serialize_str(AUTO_FPS),
        }
    }
}

impl<'de> Deserialize<'de> for MaxFps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MaxFpsVisitor)
    }
}

struct MaxFpsVisitor;

impl<'de> Visitor<'de> for MaxFpsVisitor {
    type Value = MaxFps;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer frame rate or the string \"auto\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<MaxFps, E> {
        u32::try_from(v)
            .map(MaxFps::Fixed)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<MaxFps, E> {
        u32::try_from(v)
            .map(MaxFps::Fixed)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    // 30.0 is accepted as 30; 29.97 is not.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<MaxFps, E> {
        if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) {
            Ok(MaxFps::Fixed(v as u32))
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<MaxFps, E> {
        if v == AUTO_FPS {
            Ok(MaxFps::Auto)
        } else {
            Err(E::invalid_value(Unexpected::Str(v), &self))
        }
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

/// Webhook notified as the asset moves through processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCallback {
    #[serde(default)]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<CallbackMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<CallbackHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CallbackSource>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub callback_type: Option<CallbackType>,
}

impl AssetCallback {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            headers: Vec::new(),
            source: None,
            callback_type: None,
        }
    }

    pub fn with_method(mut self, method: CallbackMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(CallbackHeader {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackHeader {
    pub name: String,
    pub value: String,
}

wire_enum! {
    /// HTTP method used to call a webhook.
    pub enum CallbackMethod {
        Get => "get",
        Post => "post",
        Put => "put",
    }
}

wire_enum! {
    /// Which component emits the callback.
    pub enum CallbackSource {
        Lightflow => "lightflow",
        Encoder => "encoder",
    }
}

wire_enum! {
    /// Payload format of the callback.
    pub enum CallbackType {
        Lightflow => "lightflow",
        Akamai => "akamai",
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

/// A manifest URL plus its streaming format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackManifest {
    #[serde(rename = "type")]
    pub manifest_type: PlaybackManifestType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<Codec>,
    #[serde(default)]
    pub url: String,
}

wire_enum! {
    pub enum PlaybackManifestType {
        Dash => "dash",
        Hls => "hls",
        Mss => "mss",
        Mp3 => "mp3",
    }
}

wire_enum! {
    /// Video codec a manifest was packaged for.
    pub enum Codec {
        X264 => "x264",
        X265 => "x265",
        Vp9 => "vp9",
    }
}

/// `GET /assets/{uuid}/playback` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protection: Option<Protection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub playback_manifests: Vec<PlaybackManifest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub renditions: Vec<Rendition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name_format: Option<String>,
}

impl PlaybackInfo {
    /// First manifest of the given format, if any.
    pub fn manifest(&self, manifest_type: PlaybackManifestType) -> Option<&PlaybackManifest> {
        self.playback_manifests
            .iter()
            .find(|m| m.manifest_type == manifest_type)
    }
}

/// DRM settings. Each license URL is present only for the DRM systems in use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protection {
    #[serde(default)]
    pub vendor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widevine: Option<LicenseUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playready: Option<LicenseUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fairplay: Option<Fairplay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseUrl {
    #[serde(rename = "licenseURL", default)]
    pub license_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fairplay {
    #[serde(rename = "licenseURL", default)]
    pub license_url: String,
    #[serde(rename = "certificateURL", skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
}

/// One encoded variant available for playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    #[serde(default)]
    pub codec: String,
    /// Vertical resolution; absent for audio-only renditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<u32>,
    #[serde(default)]
    pub bitrate: u32,
    /// "video" or "audio".
    #[serde(rename = "type", default)]
    pub rendition_type: String,
    #[serde(default)]
    pub url: String,
}

// ---------------------------------------------------------------------------
// Media metadata
// ---------------------------------------------------------------------------

/// Metadata of the probed input. Missing fields decode as zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetInfo {
    pub duration: u64,
    /// e.g. "1920x1080".
    pub resolution: String,
    pub bitrate: u64,
    pub codec: String,
    pub audio_codec: String,
    pub audio_bitrate: u64,
    pub frame_rate: f64,
    pub aspect_ratio: String,
    pub container: String,
    pub video_streams: Vec<VideoStream>,
    pub audio_streams: Vec<AudioStream>,
    pub subtitle_streams: Vec<SubtitleStream>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoStream {
    pub index: u32,
    pub codec: String,
    pub bitrate: u64,
    pub resolution: String,
    pub frame_rate: f64,
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioStream {
    pub index: u32,
    pub codec: String,
    pub bitrate: u64,
    pub channels: u32,
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleStream {
    pub index: u32,
    pub codec: String,
    pub lang: String,
}
