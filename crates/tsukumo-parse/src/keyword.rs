use std::ops::Range;

use bitflags::bitflags;
use phf::phf_map;

use crate::elements::ElementKind;

bitflags! {
    /// Flags controlling when and how a keyword matches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeywordOptions: u8 {
        /// A match claims the token it was found in.
        const IDENTIFIABLE = 0b0000_0001;
        /// The keyword scan considers this entry at all.
        const SEARCHABLE = 0b0000_0010;
        /// A match can be trusted without looking at the following token.
        /// Single-letter prefixes such as "E" are not.
        const VALID = 0b0000_0100;
    }
}

/// A dictionary entry: the element kind a keyword maps to, and its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword {
    pub kind: ElementKind,
    pub options: KeywordOptions,
}

impl Keyword {
    const fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            options: KeywordOptions::all(),
        }
    }

    const fn invalid(kind: ElementKind) -> Self {
        Self {
            kind,
            options: KeywordOptions::IDENTIFIABLE.union(KeywordOptions::SEARCHABLE),
        }
    }

    const fn unidentifiable(kind: ElementKind) -> Self {
        Self {
            kind,
            options: KeywordOptions::SEARCHABLE.union(KeywordOptions::VALID),
        }
    }

    const fn unidentifiable_invalid(kind: ElementKind) -> Self {
        Self {
            kind,
            options: KeywordOptions::SEARCHABLE,
        }
    }

    const fn unsearchable(kind: ElementKind) -> Self {
        Self {
            kind,
            options: KeywordOptions::VALID,
        }
    }

    pub fn is_identifiable(&self) -> bool {
        self.options.contains(KeywordOptions::IDENTIFIABLE)
    }

    pub fn is_searchable(&self) -> bool {
        self.options.contains(KeywordOptions::SEARCHABLE)
    }

    pub fn is_valid(&self) -> bool {
        self.options.contains(KeywordOptions::VALID)
    }
}

use ElementKind as K;

/// Compile-time keyword lookup table.
/// All keys are UPPERCASE for case-insensitive matching.
static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    // ── Season prefix ────────────────────────────────────────────
    "SAISON" => Keyword::unidentifiable(K::AnimeSeasonPrefix),
    "SEASON" => Keyword::unidentifiable(K::AnimeSeasonPrefix),

    // ── Anime type ───────────────────────────────────────────────
    "GEKIJOUBAN" => Keyword::unidentifiable(K::AnimeType),
    "MOVIE" => Keyword::unidentifiable(K::AnimeType),
    "OAD" => Keyword::unidentifiable(K::AnimeType),
    "OAV" => Keyword::unidentifiable(K::AnimeType),
    "ONA" => Keyword::unidentifiable(K::AnimeType),
    "OVA" => Keyword::unidentifiable(K::AnimeType),
    "SPECIAL" => Keyword::unidentifiable(K::AnimeType),
    "SPECIALS" => Keyword::unidentifiable(K::AnimeType),
    "TV" => Keyword::unidentifiable(K::AnimeType),
    // "Yumeiro Patissiere SP Professional"
    "SP" => Keyword::unsearchable(K::AnimeType),
    "ED" => Keyword::unidentifiable_invalid(K::AnimeType),
    "ENDING" => Keyword::unidentifiable_invalid(K::AnimeType),
    "NCED" => Keyword::unidentifiable_invalid(K::AnimeType),
    "NCOP" => Keyword::unidentifiable_invalid(K::AnimeType),
    "OP" => Keyword::unidentifiable_invalid(K::AnimeType),
    "OPENING" => Keyword::unidentifiable_invalid(K::AnimeType),
    "PREVIEW" => Keyword::unidentifiable_invalid(K::AnimeType),
    "PV" => Keyword::unidentifiable_invalid(K::AnimeType),

    // ── Audio terms ──────────────────────────────────────────────
    "2.0CH" => Keyword::new(K::AudioTerm),
    "2CH" => Keyword::new(K::AudioTerm),
    "5.1" => Keyword::new(K::AudioTerm),
    "5.1CH" => Keyword::new(K::AudioTerm),
    "DTS" => Keyword::new(K::AudioTerm),
    "DTS-ES" => Keyword::new(K::AudioTerm),
    "DTS5.1" => Keyword::new(K::AudioTerm),
    "TRUEHD5.1" => Keyword::new(K::AudioTerm),
    "AAC" => Keyword::new(K::AudioTerm),
    "AACX2" => Keyword::new(K::AudioTerm),
    "AACX3" => Keyword::new(K::AudioTerm),
    "AACX4" => Keyword::new(K::AudioTerm),
    "AC3" => Keyword::new(K::AudioTerm),
    "EAC3" => Keyword::new(K::AudioTerm),
    "E-AC-3" => Keyword::new(K::AudioTerm),
    "FLAC" => Keyword::new(K::AudioTerm),
    "FLACX2" => Keyword::new(K::AudioTerm),
    "FLACX3" => Keyword::new(K::AudioTerm),
    "FLACX4" => Keyword::new(K::AudioTerm),
    "LOSSLESS" => Keyword::new(K::AudioTerm),
    "MP3" => Keyword::new(K::AudioTerm),
    "OGG" => Keyword::new(K::AudioTerm),
    "VORBIS" => Keyword::new(K::AudioTerm),
    "DUALAUDIO" => Keyword::new(K::AudioTerm),
    "DUAL AUDIO" => Keyword::new(K::AudioTerm),

    // ── Device compatibility ─────────────────────────────────────
    "IPAD3" => Keyword::new(K::DeviceCompatibility),
    "IPHONE5" => Keyword::new(K::DeviceCompatibility),
    "IPOD" => Keyword::new(K::DeviceCompatibility),
    "PS3" => Keyword::new(K::DeviceCompatibility),
    "XBOX" => Keyword::new(K::DeviceCompatibility),
    "XBOX360" => Keyword::new(K::DeviceCompatibility),
    "ANDROID" => Keyword::unidentifiable(K::DeviceCompatibility),

    // ── Episode prefix ───────────────────────────────────────────
    "EP" => Keyword::new(K::EpisodePrefix),
    "EP." => Keyword::new(K::EpisodePrefix),
    "EPS" => Keyword::new(K::EpisodePrefix),
    "EPS." => Keyword::new(K::EpisodePrefix),
    "EPISODE" => Keyword::new(K::EpisodePrefix),
    "EPISODE." => Keyword::new(K::EpisodePrefix),
    "EPISODES" => Keyword::new(K::EpisodePrefix),
    "CAPITULO" => Keyword::new(K::EpisodePrefix),
    "EPISODIO" => Keyword::new(K::EpisodePrefix),
    "FOLGE" => Keyword::new(K::EpisodePrefix),
    "E" => Keyword::invalid(K::EpisodePrefix),
    "\u{7B2C}" => Keyword::invalid(K::EpisodePrefix),

    // ── Languages ────────────────────────────────────────────────
    "ENG" => Keyword::new(K::Language),
    "ENGLISH" => Keyword::new(K::Language),
    "ESPANOL" => Keyword::new(K::Language),
    "JAP" => Keyword::new(K::Language),
    "PT-BR" => Keyword::new(K::Language),
    "SPANISH" => Keyword::new(K::Language),
    "VOSTFR" => Keyword::new(K::Language),
    // "Tokyo ESP", "Bokura ga Ita"
    "ESP" => Keyword::unidentifiable(K::Language),
    "ITA" => Keyword::unidentifiable(K::Language),

    // ── Other ────────────────────────────────────────────────────
    "REMASTER" => Keyword::new(K::Other),
    "REMASTERED" => Keyword::new(K::Other),
    "UNCENSORED" => Keyword::new(K::Other),
    "UNCUT" => Keyword::new(K::Other),
    "TS" => Keyword::new(K::Other),
    "VFR" => Keyword::new(K::Other),
    "WIDESCREEN" => Keyword::new(K::Other),
    "WS" => Keyword::new(K::Other),

    // ── Release group ────────────────────────────────────────────
    "THORA" => Keyword::new(K::ReleaseGroup),

    // ── Release information ──────────────────────────────────────
    "BATCH" => Keyword::new(K::ReleaseInformation),
    "COMPLETE" => Keyword::new(K::ReleaseInformation),
    "PATCH" => Keyword::new(K::ReleaseInformation),
    "REMUX" => Keyword::new(K::ReleaseInformation),
    // "The End of Evangelion", "Final Approach"
    "END" => Keyword::unidentifiable(K::ReleaseInformation),
    "FINAL" => Keyword::unidentifiable(K::ReleaseInformation),

    // ── Release version ──────────────────────────────────────────
    "V0" => Keyword::new(K::ReleaseVersion),
    "V1" => Keyword::new(K::ReleaseVersion),
    "V2" => Keyword::new(K::ReleaseVersion),
    "V3" => Keyword::new(K::ReleaseVersion),
    "V4" => Keyword::new(K::ReleaseVersion),

    // ── Source ───────────────────────────────────────────────────
    "BD" => Keyword::new(K::Source),
    "BDRIP" => Keyword::new(K::Source),
    "BLURAY" => Keyword::new(K::Source),
    "BLU-RAY" => Keyword::new(K::Source),
    "DVD" => Keyword::new(K::Source),
    "DVD5" => Keyword::new(K::Source),
    "DVD9" => Keyword::new(K::Source),
    "DVD-R2J" => Keyword::new(K::Source),
    "DVDRIP" => Keyword::new(K::Source),
    "DVD-RIP" => Keyword::new(K::Source),
    "R2DVD" => Keyword::new(K::Source),
    "R2J" => Keyword::new(K::Source),
    "R2JDVD" => Keyword::new(K::Source),
    "R2JDVDRIP" => Keyword::new(K::Source),
    "HDTV" => Keyword::new(K::Source),
    "HDTVRIP" => Keyword::new(K::Source),
    "TVRIP" => Keyword::new(K::Source),
    "TV-RIP" => Keyword::new(K::Source),
    "WEBCAST" => Keyword::new(K::Source),
    "WEBRIP" => Keyword::new(K::Source),

    // ── Subtitles ────────────────────────────────────────────────
    "ASS" => Keyword::new(K::Subtitles),
    "BIG5" => Keyword::new(K::Subtitles),
    "DUB" => Keyword::new(K::Subtitles),
    "DUBBED" => Keyword::new(K::Subtitles),
    "HARDSUB" => Keyword::new(K::Subtitles),
    "HARDSUBS" => Keyword::new(K::Subtitles),
    "RAW" => Keyword::new(K::Subtitles),
    "SOFTSUB" => Keyword::new(K::Subtitles),
    "SOFTSUBS" => Keyword::new(K::Subtitles),
    "SUB" => Keyword::new(K::Subtitles),
    "SUBBED" => Keyword::new(K::Subtitles),
    "SUBTITLED" => Keyword::new(K::Subtitles),

    // ── Video terms ──────────────────────────────────────────────
    "23.976FPS" => Keyword::new(K::VideoTerm),
    "24FPS" => Keyword::new(K::VideoTerm),
    "29.97FPS" => Keyword::new(K::VideoTerm),
    "30FPS" => Keyword::new(K::VideoTerm),
    "60FPS" => Keyword::new(K::VideoTerm),
    "120FPS" => Keyword::new(K::VideoTerm),
    "8BIT" => Keyword::new(K::VideoTerm),
    "8-BIT" => Keyword::new(K::VideoTerm),
    "10BIT" => Keyword::new(K::VideoTerm),
    "10BITS" => Keyword::new(K::VideoTerm),
    "10-BIT" => Keyword::new(K::VideoTerm),
    "10-BITS" => Keyword::new(K::VideoTerm),
    "HI10" => Keyword::new(K::VideoTerm),
    "HI10P" => Keyword::new(K::VideoTerm),
    "HI444" => Keyword::new(K::VideoTerm),
    "HI444P" => Keyword::new(K::VideoTerm),
    "HI444PP" => Keyword::new(K::VideoTerm),
    "H264" => Keyword::new(K::VideoTerm),
    "H265" => Keyword::new(K::VideoTerm),
    "H.264" => Keyword::new(K::VideoTerm),
    "H.265" => Keyword::new(K::VideoTerm),
    "X264" => Keyword::new(K::VideoTerm),
    "X265" => Keyword::new(K::VideoTerm),
    "X.264" => Keyword::new(K::VideoTerm),
    "AVC" => Keyword::new(K::VideoTerm),
    "HEVC" => Keyword::new(K::VideoTerm),
    "HEVC2" => Keyword::new(K::VideoTerm),
    "DIVX" => Keyword::new(K::VideoTerm),
    "DIVX5" => Keyword::new(K::VideoTerm),
    "DIVX6" => Keyword::new(K::VideoTerm),
    "XVID" => Keyword::new(K::VideoTerm),
    "AVI" => Keyword::new(K::VideoTerm),
    "RMVB" => Keyword::new(K::VideoTerm),
    "WMV" => Keyword::new(K::VideoTerm),
    "WMV3" => Keyword::new(K::VideoTerm),
    "WMV9" => Keyword::new(K::VideoTerm),
    "HQ" => Keyword::new(K::VideoTerm),
    "LQ" => Keyword::new(K::VideoTerm),
    "HD" => Keyword::new(K::VideoTerm),
    "SD" => Keyword::new(K::VideoTerm),

    // ── Volume prefix ────────────────────────────────────────────
    "VOL" => Keyword::new(K::VolumePrefix),
    "VOL." => Keyword::new(K::VolumePrefix),
    "VOLUME" => Keyword::new(K::VolumePrefix),
};

/// File extensions live in their own namespace so "AAC" can be both an audio
/// term and an (invalid) extension.
static FILE_EXTENSIONS: phf::Map<&'static str, Keyword> = phf_map! {
    "3GP" => Keyword::new(K::FileExtension),
    "AVI" => Keyword::new(K::FileExtension),
    "DIVX" => Keyword::new(K::FileExtension),
    "FLV" => Keyword::new(K::FileExtension),
    "M2TS" => Keyword::new(K::FileExtension),
    "MKV" => Keyword::new(K::FileExtension),
    "MOV" => Keyword::new(K::FileExtension),
    "MP4" => Keyword::new(K::FileExtension),
    "MPG" => Keyword::new(K::FileExtension),
    "OGM" => Keyword::new(K::FileExtension),
    "RM" => Keyword::new(K::FileExtension),
    "RMVB" => Keyword::new(K::FileExtension),
    "TS" => Keyword::new(K::FileExtension),
    "WEBM" => Keyword::new(K::FileExtension),
    "WMV" => Keyword::new(K::FileExtension),
    "AAC" => Keyword::invalid(K::FileExtension),
    "AIFF" => Keyword::invalid(K::FileExtension),
    "FLAC" => Keyword::invalid(K::FileExtension),
    "M4A" => Keyword::invalid(K::FileExtension),
    "MP3" => Keyword::invalid(K::FileExtension),
    "MKA" => Keyword::invalid(K::FileExtension),
    "OGG" => Keyword::invalid(K::FileExtension),
    "WAV" => Keyword::invalid(K::FileExtension),
    "WMA" => Keyword::invalid(K::FileExtension),
    "7Z" => Keyword::invalid(K::FileExtension),
    "RAR" => Keyword::invalid(K::FileExtension),
    "ZIP" => Keyword::invalid(K::FileExtension),
    "ASS" => Keyword::invalid(K::FileExtension),
    "SRT" => Keyword::invalid(K::FileExtension),
};

/// Literals located by raw substring search before delimiter splitting,
/// since delimiters inside them would otherwise fragment the keyword.
static PREIDENTIFIED: &[(ElementKind, &[&str])] = &[
    (K::AudioTerm, &["Dual Audio"]),
    (K::VideoTerm, &["H264", "H.264", "h264", "h.264"]),
    (
        K::VideoResolution,
        &["480p", "720p", "1080p", "1920\u{D7}1080", "1280\u{D7}720"],
    ),
    (K::Source, &["Blu-Ray"]),
];

static STANDARD: KeywordDictionary = KeywordDictionary {
    keywords: &KEYWORDS,
    file_extensions: &FILE_EXTENSIONS,
    preidentified: PREIDENTIFIED,
};

/// A pre-identified keyword found inside a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeekMatch {
    pub kind: ElementKind,
    pub keyword: &'static str,
    /// Byte range relative to the searched text.
    pub range: Range<usize>,
}

/// Read-only keyword dictionary shared by every parse.
#[derive(Debug, Clone, Copy)]
pub struct KeywordDictionary {
    keywords: &'static phf::Map<&'static str, Keyword>,
    file_extensions: &'static phf::Map<&'static str, Keyword>,
    preidentified: &'static [(ElementKind, &'static [&'static str])],
}

impl Default for KeywordDictionary {
    fn default() -> Self {
        STANDARD
    }
}

impl KeywordDictionary {
    /// The built-in dictionary.
    pub fn standard() -> &'static KeywordDictionary {
        &STANDARD
    }

    /// Case-fold a word into dictionary key form.
    pub fn normalize(word: &str) -> String {
        word.to_uppercase()
    }

    /// Look up a normalized word.
    ///
    /// With `expected` set, the entry must be of that kind; `FileExtension`
    /// selects the file-extension namespace.
    pub fn lookup(&self, normalized: &str, expected: Option<ElementKind>) -> Option<Keyword> {
        let table = match expected {
            Some(ElementKind::FileExtension) => self.file_extensions,
            _ => self.keywords,
        };
        let keyword = table.get(normalized).copied()?;
        match expected {
            Some(kind) if kind != keyword.kind => None,
            _ => Some(keyword),
        }
    }

    pub fn contains(&self, kind: ElementKind, normalized: &str) -> bool {
        self.lookup(normalized, Some(kind)).is_some()
    }

    /// Find the pre-identified literals in `text`, first occurrence of each,
    /// ordered by position. Overlapping hits keep the earliest one.
    pub fn peek(&self, text: &str) -> Vec<PeekMatch> {
        let mut found: Vec<PeekMatch> = Vec::new();
        for &(kind, literals) in self.preidentified {
            for &keyword in literals {
                if let Some(start) = text.find(keyword) {
                    found.push(PeekMatch {
                        kind,
                        keyword,
                        range: start..start + keyword.len(),
                    });
                }
            }
        }
        found.sort_by_key(|m| m.range.start);

        let mut matches: Vec<PeekMatch> = Vec::with_capacity(found.len());
        for m in found {
            if matches.last().is_some_and(|prev| m.range.start < prev.range.end) {
                continue;
            }
            matches.push(m);
        }
        matches
    }
}
