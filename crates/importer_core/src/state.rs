use std::fmt;

/// Pipeline position of a single album.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlbumState {
    #[default]
    OpenSource,
    SubmitUrl,
    CheckExisting,
    /// Terminal: the aggregator already knows a release for this album.
    AlreadyLinked,
    Import,
    MbSubmit,
    IsrcSubmit,
    ExternalLinks,
    CoverArt,
    /// Terminal: the release is published with links, ISRCs and cover art.
    Done,
}

impl AlbumState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AlbumState::AlreadyLinked | AlbumState::Done)
    }
}

impl fmt::Display for AlbumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlbumState::OpenSource => "open source",
            AlbumState::SubmitUrl => "submit url",
            AlbumState::CheckExisting => "check existing",
            AlbumState::AlreadyLinked => "already linked",
            AlbumState::Import => "import",
            AlbumState::MbSubmit => "submit edit",
            AlbumState::IsrcSubmit => "submit isrcs",
            AlbumState::ExternalLinks => "external links",
            AlbumState::CoverArt => "cover art",
            AlbumState::Done => "done",
        };
        f.write_str(name)
    }
}

/// One album of the batch. Only [`crate::update`] advances it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumJob {
    source_url: String,
    state: AlbumState,
    release_id: Option<String>,
}

impl AlbumJob {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            state: AlbumState::OpenSource,
            release_id: None,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn state(&self) -> AlbumState {
        self.state
    }

    /// Existing release link for `AlreadyLinked`, generated identifier for `Done`
    /// (only read when it is copied to the clipboard).
    pub fn release_id(&self) -> Option<&str> {
        self.release_id.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    pub(crate) fn set_state(&mut self, state: AlbumState) {
        self.state = state;
    }

    pub(crate) fn set_release_id(&mut self, id: String) {
        self.release_id = Some(id);
    }
}
