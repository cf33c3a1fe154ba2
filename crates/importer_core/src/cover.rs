use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static COVER_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Cover art \((\d+)\)").expect("valid cover count pattern"));

/// A fetched and decoded cover-art image.
#[derive(Clone, PartialEq, Eq)]
pub struct CoverArtCandidate {
    pub source_url: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl CoverArtCandidate {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Debug for CoverArtCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverArtCandidate")
            .field("source_url", &self.source_url)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// URLs to try for one cover element: the wrapping link first (usually the
/// full-size image), then the displayed image if it differs.
pub fn candidate_urls(link_href: Option<&str>, image_src: Option<&str>) -> Vec<String> {
    let mut urls: Vec<String> = Vec::with_capacity(2);
    for url in [link_href, image_src].into_iter().flatten() {
        let url = url.trim();
        if !url.is_empty() && !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Running best-by-area over candidates in scan order.
#[derive(Debug, Default)]
pub struct BestCandidate {
    best: Option<CoverArtCandidate>,
}

impl BestCandidate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the candidate if it is strictly larger than the current best, so
    /// ties stay with the earlier one. Returns whether it was kept.
    pub fn offer(&mut self, candidate: CoverArtCandidate) -> bool {
        let larger = self
            .best
            .as_ref()
            .map_or(true, |best| candidate.area() > best.area());
        if larger {
            self.best = Some(candidate);
        }
        larger
    }

    pub fn best(&self) -> Option<&CoverArtCandidate> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<CoverArtCandidate> {
        self.best
    }
}

/// Reads the number of covers already attached from the release's
/// "Cover art (N)" tab label.
pub fn parse_existing_cover_count(text: &str) -> Option<u32> {
    COVER_COUNT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
