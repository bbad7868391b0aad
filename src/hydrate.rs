//! Upgrading stub records to full records.
//!
//! Records fetched by id are merged over the record already held with
//! [`Merge::merge`], so a field the by-ID endpoint leaves out keeps the value
//! the stub had. The merge only runs after a successful fetch; a failed
//! hydration leaves the record untouched.
//!
//! Assets hydrate differently: they download their content from their own
//! access path and keep it in [`AssetContent`](crate::models::AssetContent).

use async_trait::async_trait;
use futures_util::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::client::Archive;
use crate::models::{
    Asset, Collection, Contributor, Coverage, Document, MediaFile, Merge, Repository, Resource,
    Subject, Theme, Transcript, Translation,
};
use crate::transport::ArchiveError;

/// Kinds that can be upgraded from a stub to a full record.
///
/// Hydration takes `&mut self`, so one record can never be hydrated twice
/// at the same time.
#[async_trait]
pub trait Hydrateable: Resource {
    /// Key passed to the by-ID endpoint.
    fn lookup_key(&self) -> &str {
        self.id()
    }

    /// Replace the record with the archive's full version, without merging.
    async fn pull(&mut self, archive: &Archive) -> Result<(), ArchiveError>;

    /// Fetch the full record and merge it over this one.
    async fn hydrate(&mut self, archive: &Archive) -> Result<(), ArchiveError>;

    /// Hydrate, then hydrate the records this one embeds.
    ///
    /// Only documents embed hydrateable records; every other kind behaves
    /// like [`hydrate`](Self::hydrate).
    async fn hydrate_recursive(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
        self.hydrate(archive).await
    }
}

async fn fetch<T: Hydrateable>(record: &T, archive: &Archive) -> Result<T, ArchiveError> {
    let key = record.lookup_key();
    debug!("Fetching full {} {}", T::KIND, key);
    let value = archive.transport().get(T::endpoint(), key).await?;
    T::from_json(value)
}

async fn pull_record<T: Hydrateable>(record: &mut T, archive: &Archive) -> Result<(), ArchiveError> {
    *record = fetch(record, archive).await?;
    Ok(())
}

async fn merge_record<T: Hydrateable + Merge>(
    record: &mut T,
    archive: &Archive,
) -> Result<(), ArchiveError> {
    let fresh = fetch(record, archive).await?;
    *record = T::merge(record.clone(), fresh);
    info!("Hydrated {} {}", T::KIND, record.id());
    Ok(())
}

async fn load_asset<A: Asset>(asset: &mut A, archive: &Archive) -> Result<(), ArchiveError> {
    debug!("Downloading {} {} from {}", A::KIND, asset.id(), asset.url());
    let body = archive.transport().get_asset(asset.url()).await?;
    let extension = asset.extension().to_string();
    asset.content_mut().load(&extension, body);
    info!("Hydrated {} {}", A::KIND, asset.id());
    Ok(())
}

/// Hydrate every record, with at most the archive's request limit in flight.
pub async fn hydrate_all<T: Hydrateable>(
    archive: &Archive,
    records: &mut [T],
    recurse: bool,
) -> Result<(), ArchiveError> {
    let limit = archive.max_concurrent_requests().max(1);
    let pending: Vec<_> = records
        .iter_mut()
        .map(|record| hydrate_one(record, archive, recurse))
        .collect();
    stream::iter(pending)
        .buffer_unordered(limit)
        .try_collect::<Vec<()>>()
        .await?;
    Ok(())
}

async fn hydrate_one<T: Hydrateable>(
    record: &mut T,
    archive: &Archive,
    recurse: bool,
) -> Result<(), ArchiveError> {
    if recurse {
        record.hydrate_recursive(archive).await
    } else {
        record.hydrate(archive).await
    }
}

macro_rules! hydrate_by_id {
    ($($ty:ident),* $(,)?) => {
        $(
            #[async_trait]
            impl Hydrateable for $ty {
                async fn pull(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
                    pull_record(self, archive).await
                }

                async fn hydrate(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
                    merge_record(self, archive).await
                }
            }
        )*
    };
}

hydrate_by_id!(Subject, Contributor, Coverage, Collection, Repository);

#[async_trait]
impl Hydrateable for Theme {
    fn lookup_key(&self) -> &str {
        &self.slug
    }

    async fn pull(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
        pull_record(self, archive).await
    }

    async fn hydrate(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
        merge_record(self, archive).await
    }
}

#[async_trait]
impl Hydrateable for Document {
    async fn pull(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
        pull_record(self, archive).await
    }

    async fn hydrate(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
        merge_record(self, archive).await
    }

    async fn hydrate_recursive(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
        self.hydrate(archive).await?;

        if let Some(transcripts) = self.transcripts.value_mut() {
            hydrate_all(archive, transcripts, false).await?;
        }
        if let Some(translations) = self.translations.value_mut() {
            hydrate_all(archive, translations, false).await?;
        }
        if let Some(media_files) = self.media_files.value_mut() {
            hydrate_all(archive, media_files, false).await?;
        }
        if let Some(collections) = self.collections.value_mut() {
            hydrate_all(archive, collections, false).await?;
        }
        Ok(())
    }
}

macro_rules! hydrate_asset {
    ($($ty:ident),* $(,)?) => {
        $(
            #[async_trait]
            impl Hydrateable for $ty {
                fn lookup_key(&self) -> &str {
                    self.url()
                }

                async fn pull(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
                    load_asset(self, archive).await
                }

                async fn hydrate(&mut self, archive: &Archive) -> Result<(), ArchiveError> {
                    load_asset(self, archive).await
                }
            }
        )*
    };
}

hydrate_asset!(Transcript, Translation, MediaFile);
