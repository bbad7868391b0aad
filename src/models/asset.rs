//! Downloadable files attached to documents.
//!
//! Assets share one hydration path: their content is downloaded from the
//! access path they carry, not from a by-ID endpoint. Stub assets embedded
//! in a document only carry metadata; the downloaded bytes live in
//! [`AssetContent`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::de;
use super::entities::Language;
use super::resource::resource_identity;
use super::{Field, Resource};

/// Downloaded content of an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetContent {
    /// Body exactly as served
    pub raw: Field<Vec<u8>>,
    /// Decoded text, for `html` assets
    pub html: Field<String>,
    /// PDF bytes, for `pdf` assets
    pub pdf: Field<Vec<u8>>,
}

impl AssetContent {
    /// Store a downloaded body according to the asset's file extension.
    ///
    /// The raw bytes are always kept. For an extension other than `html` or
    /// `pdf` only `raw` is touched.
    pub fn load(&mut self, extension: &str, body: Vec<u8>) {
        match extension {
            "html" => {
                self.html = Field::Value(String::from_utf8_lossy(&body).into_owned());
                self.pdf = Field::Null;
            }
            "pdf" => {
                self.pdf = Field::Value(body.clone());
                self.html = Field::Null;
            }
            other => warn!("Unknown asset file format '{}', keeping raw content only", other),
        }
        self.raw = Field::Value(body);
    }

    pub fn is_loaded(&self) -> bool {
        !self.raw.is_unfetched()
    }
}

/// Common surface of [`Transcript`], [`Translation`] and [`MediaFile`].
pub trait Asset: Resource {
    /// Access path of the file, relative to the archive host.
    fn url(&self) -> &str;

    fn extension(&self) -> &str;

    fn content(&self) -> &AssetContent;

    fn content_mut(&mut self) -> &mut AssetContent;
}

macro_rules! asset_impl {
    ($ty:ident, $url:ident) => {
        impl Asset for $ty {
            fn url(&self) -> &str {
                &self.$url
            }

            fn extension(&self) -> &str {
                &self.extension
            }

            fn content(&self) -> &AssetContent {
                &self.content
            }

            fn content_mut(&mut self) -> &mut AssetContent {
                &mut self.content
            }
        }
    };
}

/// A transcript of a document in its original language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transcript {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub extension: String,
    #[serde(deserialize_with = "de::id")]
    pub asset_id: String,
    pub source_created_at: String,
    pub source_updated_at: String,
    pub url: String,
    #[serde(skip)]
    pub content: AssetContent,
}

resource_identity!(Transcript, Transcript);
asset_impl!(Transcript, url);

/// A translation of a document into another language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Translation {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub extension: String,
    #[serde(deserialize_with = "de::id")]
    pub asset_id: String,
    pub source_created_at: String,
    pub source_updated_at: String,
    pub url: String,
    pub language: Language,
    #[serde(skip)]
    pub content: AssetContent,
}

resource_identity!(Translation, Translation);
asset_impl!(Translation, url);

/// A scan or other media file of the original document.
///
/// The archive calls its access path `path` rather than `url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaFile {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub extension: String,
    #[serde(deserialize_with = "de::id")]
    pub asset_id: String,
    pub source_created_at: String,
    pub source_updated_at: String,
    pub path: String,
    #[serde(skip)]
    pub content: AssetContent,
}

resource_identity!(MediaFile, MediaFile);
asset_impl!(MediaFile, path);
