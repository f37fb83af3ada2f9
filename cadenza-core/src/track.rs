//! Track metadata and the playlist that owns it.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Album art endpoint; the album identifier is appended after the size prefix.
const ALBUM_ART_URL_PREFIX: &str = "https://y.gtimg.cn/music/photo_new/T002R300x300M000";

/// Album reference carried by a track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(rename = "albumMid", default)]
    pub mid: String,
    #[serde(rename = "albumName", default)]
    pub name: String,
}

/// A performer credited on a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Singer {
    #[serde(rename = "singerMid", default)]
    pub mid: String,
    #[serde(rename = "singerName")]
    pub name: String,
}

/// A track as returned by the metadata collaborator. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Stable track identifier, used for fallback stream URLs and lyrics
    #[serde(rename = "songMid")]
    pub id: String,
    #[serde(rename = "songName")]
    pub name: String,
    #[serde(default)]
    pub album: AlbumRef,
    #[serde(rename = "singerList", default)]
    pub singers: Vec<Singer>,
    /// File name token of the primary stream (e.g. `C400xxxx.m4a`)
    #[serde(rename = "fileName")]
    pub file_name: String,
}

impl Track {
    /// Create a track without album or performer information.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            album: AlbumRef::default(),
            singers: Vec::new(),
            file_name: file_name.into(),
        }
    }

    #[must_use]
    pub fn with_album(mut self, mid: impl Into<String>, name: impl Into<String>) -> Self {
        self.album = AlbumRef {
            mid: mid.into(),
            name: name.into(),
        };
        self
    }

    #[must_use]
    pub fn with_singer(mut self, name: impl Into<String>) -> Self {
        self.singers.push(Singer {
            mid: String::new(),
            name: name.into(),
        });
        self
    }

    /// Performer names joined with `,`
    #[must_use]
    pub fn display_artists(&self) -> String {
        self.singers
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Cover image used as the notification icon.
    #[must_use]
    pub fn album_art_url(&self) -> String {
        format!("{ALBUM_ART_URL_PREFIX}{}.jpg?max_age=2592000", self.album.mid)
    }

    /// File name suggested to the download collaborator.
    #[must_use]
    pub fn download_file_name(&self) -> String {
        format!("{} - {}.m4a", self.name, self.display_artists())
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.singers.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} - {}", self.display_artists(), self.name)
        }
    }
}

/// Ordered, immutable list of tracks. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Arc<[Track]>,
}

impl Playlist {
    #[must_use]
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: tracks.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Look up a track, failing with [`CoreError::InvalidIndex`] when out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not a valid position in this playlist.
    pub fn track(&self, index: usize) -> Result<&Track> {
        self.tracks.get(index).ok_or(CoreError::InvalidIndex {
            index,
            len: self.tracks.len(),
        })
    }
}

impl From<Vec<Track>> for Playlist {
    fn from(tracks: Vec<Track>) -> Self {
        Self::new(tracks)
    }
}
