use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of fact an [`Element`] records about a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    AnimeSeason,
    AnimeSeasonPrefix,
    AnimeType,
    AnimeYear,
    AudioTerm,
    DeviceCompatibility,
    EpisodeNumber,
    EpisodeNumberAlt,
    EpisodePrefix,
    EpisodeTitle,
    FileChecksum,
    FileExtension,
    FileName,
    Language,
    Other,
    ReleaseGroup,
    ReleaseInformation,
    ReleaseVersion,
    Source,
    Subtitles,
    Title,
    VideoResolution,
    VideoTerm,
    VolumeNumber,
    VolumePrefix,
    Unknown,
}

impl ElementKind {
    pub const ALL: [ElementKind; 26] = [
        Self::AnimeSeason,
        Self::AnimeSeasonPrefix,
        Self::AnimeType,
        Self::AnimeYear,
        Self::AudioTerm,
        Self::DeviceCompatibility,
        Self::EpisodeNumber,
        Self::EpisodeNumberAlt,
        Self::EpisodePrefix,
        Self::EpisodeTitle,
        Self::FileChecksum,
        Self::FileExtension,
        Self::FileName,
        Self::Language,
        Self::Other,
        Self::ReleaseGroup,
        Self::ReleaseInformation,
        Self::ReleaseVersion,
        Self::Source,
        Self::Subtitles,
        Self::Title,
        Self::VideoResolution,
        Self::VideoTerm,
        Self::VolumeNumber,
        Self::VolumePrefix,
        Self::Unknown,
    ];

    /// Singular kinds are retained at most once per parse.
    pub fn is_singular(self) -> bool {
        !matches!(
            self,
            Self::AnimeType
                | Self::AudioTerm
                | Self::DeviceCompatibility
                | Self::EpisodeNumber
                | Self::Language
                | Self::Other
                | Self::ReleaseInformation
                | Self::Source
                | Self::VideoTerm
        )
    }

    /// Whether the keyword scan may produce this kind at all.
    pub fn is_searchable(self) -> bool {
        matches!(
            self,
            Self::AnimeSeasonPrefix
                | Self::AnimeType
                | Self::AudioTerm
                | Self::DeviceCompatibility
                | Self::EpisodePrefix
                | Self::FileChecksum
                | Self::Language
                | Self::Other
                | Self::ReleaseGroup
                | Self::ReleaseInformation
                | Self::ReleaseVersion
                | Self::Source
                | Self::Subtitles
                | Self::VideoResolution
                | Self::VideoTerm
                | Self::VolumePrefix
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnimeSeason => "anime_season",
            Self::AnimeSeasonPrefix => "anime_season_prefix",
            Self::AnimeType => "anime_type",
            Self::AnimeYear => "anime_year",
            Self::AudioTerm => "audio_term",
            Self::DeviceCompatibility => "device_compatibility",
            Self::EpisodeNumber => "episode_number",
            Self::EpisodeNumberAlt => "episode_number_alt",
            Self::EpisodePrefix => "episode_prefix",
            Self::EpisodeTitle => "episode_title",
            Self::FileChecksum => "file_checksum",
            Self::FileExtension => "file_extension",
            Self::FileName => "file_name",
            Self::Language => "language",
            Self::Other => "other",
            Self::ReleaseGroup => "release_group",
            Self::ReleaseInformation => "release_information",
            Self::ReleaseVersion => "release_version",
            Self::Source => "source",
            Self::Subtitles => "subtitles",
            Self::Title => "title",
            Self::VideoResolution => "video_resolution",
            Self::VideoTerm => "video_term",
            Self::VolumeNumber => "volume_number",
            Self::VolumePrefix => "volume_prefix",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted `(kind, value)` fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    pub value: String,
}

/// Insertion-ordered list of parsed elements.
///
/// Repeatable kinds may appear any number of times; a second insert of a
/// singular kind is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Elements {
    items: Vec<Element>,
}

impl Elements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element. Returns `false` if `kind` is singular and already present.
    pub fn insert(&mut self, kind: ElementKind, value: impl Into<String>) -> bool {
        if kind.is_singular() && self.contains(kind) {
            return false;
        }
        self.items.push(Element {
            kind,
            value: value.into(),
        });
        true
    }

    /// First value recorded for `kind`.
    pub fn get(&self, kind: ElementKind) -> Option<&str> {
        self.items
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.value.as_str())
    }

    pub fn get_all(&self, kind: ElementKind) -> Vec<&str> {
        self.items
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.value.as_str())
            .collect()
    }

    pub fn contains(&self, kind: ElementKind) -> bool {
        self.items.iter().any(|e| e.kind == kind)
    }

    pub fn count(&self, kind: ElementKind) -> usize {
        self.items.iter().filter(|e| e.kind == kind).count()
    }

    /// Remove every element of `kind`, returning how many were dropped.
    pub fn remove_kind(&mut self, kind: ElementKind) -> usize {
        let before = self.items.len();
        self.items.retain(|e| e.kind != kind);
        before - self.items.len()
    }

    /// Remove the first element matching both `kind` and `value`.
    pub fn remove_value(&mut self, kind: ElementKind, value: &str) -> bool {
        match self
            .items
            .iter()
            .position(|e| e.kind == kind && e.value == value)
        {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Change the kind of the first `from` element to `to`, in place.
    ///
    /// Refused when `to` is singular and already present.
    pub fn relabel(&mut self, from: ElementKind, to: ElementKind) -> bool {
        if to.is_singular() && self.contains(to) {
            return false;
        }
        match self.items.iter_mut().find(|e| e.kind == from) {
            Some(element) => {
                element.kind = to;
                true
            }
            None => false,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.get(ElementKind::Title)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Elements {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_insert_refused() {
        let mut elements = Elements::new();
        assert!(elements.insert(ElementKind::Title, "Toradora!"));
        assert!(!elements.insert(ElementKind::Title, "Other"));
        assert_eq!(elements.count(ElementKind::Title), 1);
        assert_eq!(elements.title(), Some("Toradora!"));
    }

    #[test]
    fn test_repeatable_insert() {
        let mut elements = Elements::new();
        assert!(elements.insert(ElementKind::AudioTerm, "FLAC"));
        assert!(elements.insert(ElementKind::AudioTerm, "AAC"));
        assert_eq!(elements.get_all(ElementKind::AudioTerm), vec!["FLAC", "AAC"]);
        assert_eq!(elements.get(ElementKind::AudioTerm), Some("FLAC"));
    }

    #[test]
    fn test_relabel() {
        let mut elements = Elements::new();
        elements.insert(ElementKind::EpisodeNumber, "176");
        assert!(elements.relabel(ElementKind::EpisodeNumber, ElementKind::EpisodeNumberAlt));
        assert_eq!(elements.get(ElementKind::EpisodeNumberAlt), Some("176"));
        assert!(!elements.contains(ElementKind::EpisodeNumber));

        elements.insert(ElementKind::EpisodeNumber, "200");
        assert!(!elements.relabel(ElementKind::EpisodeNumber, ElementKind::EpisodeNumberAlt));
    }

    #[test]
    fn test_remove() {
        let mut elements = Elements::new();
        elements.insert(ElementKind::AnimeType, "OVA");
        elements.insert(ElementKind::AnimeType, "TV");
        assert!(elements.remove_value(ElementKind::AnimeType, "TV"));
        assert!(!elements.remove_value(ElementKind::AnimeType, "TV"));
        assert_eq!(elements.remove_kind(ElementKind::AnimeType), 1);
        assert!(elements.is_empty());
    }

    #[test]
    fn test_kind_tables() {
        let repeatable: Vec<_> = ElementKind::ALL
            .iter()
            .filter(|k| !k.is_singular())
            .collect();
        assert_eq!(repeatable.len(), 9);
        assert!(ElementKind::VolumeNumber.is_singular());
        assert!(!ElementKind::Title.is_searchable());
        assert!(ElementKind::EpisodePrefix.is_searchable());
    }

    #[test]
    fn test_serializes_as_list() {
        let mut elements = Elements::new();
        elements.insert(ElementKind::EpisodeNumberAlt, "176");
        let json = serde_json::to_string(&elements).unwrap();
        assert_eq!(json, r#"[{"kind":"episode_number_alt","value":"176"}]"#);
        assert_eq!(ElementKind::EpisodeNumberAlt.to_string(), "episode_number_alt");
    }
}
