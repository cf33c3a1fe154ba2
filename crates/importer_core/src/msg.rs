#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The aggregator landing page is loaded and the provider option enabled.
    SourceOpened,
    /// The album URL was submitted and the result page settled.
    UrlSubmitted,
    /// The aggregator reports an existing release for the album.
    AlreadyLinked { link: String },
    /// No existing release; the import can go ahead.
    NotLinked,
    /// The import action opened the processing tab.
    ImportOpened,
    /// The edit was entered and the release page confirmed it.
    Published,
    /// ISRC registration ran (or was skipped); its outcome never blocks the album.
    IsrcFinished,
    /// Every external-ID link was submitted.
    LinksFinished,
    /// Cover art was persisted and attached (or already present).
    CoverArtFinished,
    /// The generated release identifier was read from the processing tab.
    ReleaseIdRead { id: String },
}
