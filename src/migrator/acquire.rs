//! Fetch-and-publish of single images and the sliced submission loop.

use futures::stream::{self, StreamExt};

use super::{IMAGE_QUOTA, Migrator};

/// Which candidate list a URL came from; becomes part of the staged filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceKind {
    /// The record's primary source-URL list
    Original,
    /// The record's previously-stored/fallback list
    Backup,
}

impl SourceKind {
    pub(crate) fn tag(self) -> &'static str {
        match self {
            SourceKind::Original => "original",
            SourceKind::Backup => "backup",
        }
    }
}

impl Migrator {
    /// Acquire one image: stage it locally, then publish it under its staged
    /// filename. Returns the public URL, or `None` if either step failed.
    ///
    /// Holds one permit of the process-wide pool for its whole duration, so
    /// at most [`MAX_CONCURRENT_ACQUISITIONS`](super::MAX_CONCURRENT_ACQUISITIONS)
    /// fetch/publish pairs are in flight at once across all records.
    pub(crate) async fn acquire(&self, url: &str, name_prefix: &str) -> Option<String> {
        let _permit = self.acquire_limit.acquire().await.ok()?;

        let staged = self.fetcher.fetch(url, &self.staging_dir, name_prefix).await?;
        self.store
            .publish(&staged.path, &staged.filename, staged.content_type.as_deref())
            .await
    }

    /// Work through one candidate list, appending published URLs to
    /// `acquired` until the quota is met or the list is exhausted.
    ///
    /// Submission is sliced: at most `quota - acquired` tasks go out per
    /// round, the round is awaited fully, and only then is the quota
    /// re-checked. This never submits work that a concurrent success has
    /// already made unnecessary. Results land in completion order, which may
    /// differ from submission order.
    ///
    /// Ordinals in the staged filename are the 1-based positions within the
    /// (already filtered) candidate list, so the names stay deterministic
    /// across runs regardless of which candidates succeed.
    pub(crate) async fn acquire_from_list(
        &self,
        record_prefix: &str,
        kind: SourceKind,
        urls: &[String],
        acquired: &mut Vec<String>,
    ) {
        let mut next = 0;
        while acquired.len() < IMAGE_QUOTA && next < urls.len() {
            let want = IMAGE_QUOTA - acquired.len();
            let slice_end = (next + want).min(urls.len());

            let round: Vec<Option<String>> = stream::iter(next..slice_end)
                .map(|i| {
                    let name_prefix = format!("{}_{}{}", record_prefix, kind.tag(), i + 1);
                    let url = &urls[i];
                    async move { self.acquire(url, &name_prefix).await }
                })
                .buffer_unordered(want)
                .collect()
                .await;

            acquired.extend(round.into_iter().flatten());
            next = slice_end;
        }
    }
}
