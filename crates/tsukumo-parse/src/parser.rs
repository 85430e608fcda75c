mod episode;
mod season;
mod title;
mod volume;

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::elements::{ElementKind, Elements};
use crate::keyword::KeywordDictionary;
use crate::options::Options;
use crate::text::{is_crc32, is_dash_or_space, is_numeric, starts_with_digit, to_int};
use crate::token::{find_next_token, is_token_isolated, Token, TokenFlags, TokenKind};
use crate::tokenizer;

/// Everything a parse produced: the extracted elements and the annotated
/// tokens they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub elements: Elements,
    pub tokens: Vec<Token>,
}

impl ParseResult {
    /// A parse succeeds when it found a non-empty title.
    pub fn is_success(&self) -> bool {
        self.elements.title().is_some_and(|title| !title.is_empty())
    }

    pub fn get(&self, kind: ElementKind) -> Option<&str> {
        self.elements.get(kind)
    }
}

/// Parse an anime filename with the default options and dictionary.
///
/// # Example
/// ```
/// use tsukumo_parse::ElementKind;
///
/// let result = tsukumo_parse::parse("[SubsPlease] Sousou no Frieren - 05 (1080p) [ABCD1234].mkv");
/// assert_eq!(result.get(ElementKind::Title), Some("Sousou no Frieren"));
/// assert_eq!(result.get(ElementKind::EpisodeNumber), Some("05"));
/// assert_eq!(result.get(ElementKind::ReleaseGroup), Some("SubsPlease"));
/// assert_eq!(result.get(ElementKind::VideoResolution), Some("1080p"));
/// assert_eq!(result.get(ElementKind::FileChecksum), Some("ABCD1234"));
/// ```
pub fn parse(filename: &str) -> ParseResult {
    parse_with(filename, &Options::default(), KeywordDictionary::standard())
}

/// Parse a filename given as raw bytes. Ill-formed UTF-8 is replaced with U+FFFD.
pub fn parse_bytes(
    filename: &[u8],
    options: &Options,
    dictionary: &KeywordDictionary,
) -> ParseResult {
    parse_with(&String::from_utf8_lossy(filename), options, dictionary)
}

#[tracing::instrument(name = "parse", skip(options, dictionary), fields(filename = %filename))]
pub fn parse_with(
    filename: &str,
    options: &Options,
    dictionary: &KeywordDictionary,
) -> ParseResult {
    let mut elements = Elements::new();
    let mut name = filename;

    if options.parse_file_extension {
        if let Some((stem, extension)) = split_extension(filename, dictionary) {
            elements.insert(ElementKind::FileExtension, extension);
            name = stem;
        }
    }

    let name = remove_ignored_strings(name, &options.ignored_strings);
    if name.is_empty() {
        tracing::debug!("Nothing left to parse");
        return ParseResult::default();
    }
    elements.insert(ElementKind::FileName, name.as_str());

    let mut parser = Parser::new(&name, elements, options, dictionary);
    parser.run();
    let result = parser.into_result();

    tracing::debug!(
        success = result.is_success(),
        elements = result.elements.len(),
        tokens = result.tokens.len(),
        "Parsed filename"
    );
    result
}

/// Split off a trailing `.ext` of up to four alphanumeric characters that
/// the dictionary knows as a file extension.
fn split_extension<'f>(
    filename: &'f str,
    dictionary: &KeywordDictionary,
) -> Option<(&'f str, &'f str)> {
    let (stem, extension) = filename.rsplit_once('.')?;
    if extension.is_empty()
        || extension.len() > 4
        || !extension.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return None;
    }
    dictionary
        .contains(
            ElementKind::FileExtension,
            &KeywordDictionary::normalize(extension),
        )
        .then_some((stem, extension))
}

fn remove_ignored_strings(filename: &str, ignored: &[String]) -> String {
    ignored
        .iter()
        .filter(|s| !s.is_empty())
        .fold(filename.to_string(), |name, s| name.replace(s.as_str(), ""))
}

/// A parser pass. Each pass checks its own preconditions.
type Pass = fn(&mut Parser<'_>);

/// Order matters: later passes only see tokens earlier passes left unclaimed.
const PASSES: &[(&str, Pass)] = &[
    ("keywords", search_for_keywords),
    ("isolated_numbers", search_for_isolated_numbers),
    ("episode_number", episode::search_for_episode_number),
    ("anime_title", title::search_for_anime_title),
    ("release_group", title::search_for_release_group),
    ("episode_title", title::search_for_episode_title),
    ("validate", validate_elements),
];

const ANIME_YEAR_MIN: u32 = 1900;
const ANIME_YEAR_MAX: u32 = 2050;

/// Parse state for a single filename.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    elements: Elements,
    options: &'a Options,
    dictionary: &'a KeywordDictionary,
    /// An episode number was already set by a prefix keyword when the
    /// episode pass started.
    found_episode_keywords: bool,
}

impl<'a> Parser<'a> {
    /// Tokenize `filename`. `elements` carries anything found during
    /// pre-processing.
    pub fn new(
        filename: &str,
        mut elements: Elements,
        options: &'a Options,
        dictionary: &'a KeywordDictionary,
    ) -> Self {
        let tokens = tokenizer::tokenize(filename, options, dictionary, &mut elements);
        Self {
            tokens,
            elements,
            options,
            dictionary,
            found_episode_keywords: false,
        }
    }

    /// Run every pass in order.
    pub fn run(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        for &(name, pass) in PASSES {
            pass(self);
            tracing::trace!(pass = name, elements = self.elements.len(), "Pass finished");
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn into_result(self) -> ParseResult {
        ParseResult {
            elements: self.elements,
            tokens: self.tokens,
        }
    }

    fn claim(&mut self, index: usize, kind: ElementKind) {
        self.tokens[index].claim(kind);
    }

    /// Join the tokens in `range` into one element value and claim the
    /// free-text tokens that went into it.
    ///
    /// Without `keep_delimiters`, interior delimiters become a single space
    /// (`,` and `&` stay as they are) and the result is trimmed of spaces
    /// and dashes.
    fn build_element(
        &mut self,
        kind: ElementKind,
        keep_delimiters: bool,
        range: Range<usize>,
    ) -> bool {
        let mut value = String::new();
        let mut consumed = Vec::new();

        for index in range.clone() {
            let token = &self.tokens[index];
            match token.kind {
                TokenKind::Unknown => {
                    value.push_str(&token.text);
                    consumed.push(index);
                }
                TokenKind::OpenBracket | TokenKind::CloseBracket => value.push_str(&token.text),
                TokenKind::Delimiter if keep_delimiters => value.push_str(&token.text),
                TokenKind::Delimiter if index != range.start => match token.first_char() {
                    Some(c @ (',' | '&')) => value.push(c),
                    _ => value.push(' '),
                },
                _ => {}
            }
        }

        let value = if keep_delimiters {
            value
        } else {
            value.trim_matches(is_dash_or_space).to_string()
        };
        if value.is_empty() || !self.elements.insert(kind, value) {
            return false;
        }
        for index in consumed {
            self.claim(index, kind);
        }
        true
    }
}

static RE_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,}[xX\u{D7}]\d{3,}$|^\d{3,}[pP]$").unwrap());

/// Pass: dictionary lookup of every free-text token.
fn search_for_keywords(parser: &mut Parser<'_>) {
    for index in 0..parser.tokens.len() {
        check_keyword(parser, index);
    }
}

fn check_keyword(parser: &mut Parser<'_>, index: usize) {
    let token = &parser.tokens[index];
    if !token.is_unknown() || token.keyword.is_some() {
        return;
    }
    let word = token.text.trim_matches([' ', '-']);
    if word.is_empty() {
        return;
    }
    // Numbers can't be keywords, though they can be checksums.
    if word.len() != 8 && is_numeric(word) {
        return;
    }
    let word = word.to_string();

    let (kind, identifiable, value) =
        match parser.dictionary.lookup(&KeywordDictionary::normalize(&word), None) {
            Some(keyword) => {
                let kind = keyword.kind;
                parser.tokens[index].keyword = Some(kind);
                if kind == ElementKind::ReleaseGroup && !parser.options.parse_release_group {
                    return;
                }
                if !kind.is_searchable() || !keyword.is_searchable() {
                    return;
                }
                if kind.is_singular() && parser.elements.contains(kind) {
                    return;
                }
                match kind {
                    ElementKind::AnimeSeasonPrefix => {
                        season::check_anime_season_keyword(parser, index);
                        return;
                    }
                    ElementKind::EpisodePrefix => {
                        if keyword.is_valid() {
                            check_extent_keyword(parser, ElementKind::EpisodeNumber, index);
                        }
                        return;
                    }
                    ElementKind::VolumePrefix => {
                        check_extent_keyword(parser, ElementKind::VolumeNumber, index);
                        return;
                    }
                    // Version number without the "v"
                    ElementKind::ReleaseVersion => {
                        (kind, keyword.is_identifiable(), word[1..].to_string())
                    }
                    _ => (kind, keyword.is_identifiable(), word),
                }
            }
            None => {
                let kind = if !parser.elements.contains(ElementKind::FileChecksum)
                    && is_crc32(&word)
                {
                    ElementKind::FileChecksum
                } else if !parser.elements.contains(ElementKind::VideoResolution)
                    && RE_RESOLUTION.is_match(&word)
                {
                    ElementKind::VideoResolution
                } else {
                    return;
                };
                (kind, true, word)
            }
        };

    if parser.elements.insert(kind, value) && identifiable {
        parser.claim(index, kind);
    }
}

/// A prefix keyword ("Episode", "Vol") followed by a token starting with a
/// digit: the two together give the number.
fn check_extent_keyword(parser: &mut Parser<'_>, kind: ElementKind, index: usize) {
    let tokens = &parser.tokens;
    let Some(next) = find_next_token(tokens, index, TokenFlags::NOT_DELIMITER) else {
        return;
    };
    if !tokens[next].is_unknown() || !starts_with_digit(&tokens[next].text) {
        return;
    }
    let number = tokens[next].text.clone();

    match kind {
        ElementKind::EpisodeNumber => {
            if !episode::match_episode_patterns(parser, &number, next) {
                episode::set_episode_number(parser, &number, next);
            }
            parser.claim(index, ElementKind::EpisodePrefix);
        }
        ElementKind::VolumeNumber => {
            if !volume::match_volume_patterns(parser, &number, next) {
                volume::set_volume_number(parser, &number, next, false);
            }
            parser.claim(index, ElementKind::VolumePrefix);
        }
        _ => {}
    }
}

/// Pass: bracket-isolated numbers that look like a year or a resolution.
fn search_for_isolated_numbers(parser: &mut Parser<'_>) {
    for index in 0..parser.tokens.len() {
        let token = &parser.tokens[index];
        if !token.is_unknown()
            || !is_numeric(&token.text)
            || !is_token_isolated(&parser.tokens, index)
        {
            continue;
        }
        let number = to_int(&token.text);
        let value = token.text.clone();

        if (ANIME_YEAR_MIN..=ANIME_YEAR_MAX).contains(&number)
            && parser.elements.insert(ElementKind::AnimeYear, value.as_str())
        {
            parser.claim(index, ElementKind::AnimeYear);
            continue;
        }
        // Isolated, these are more likely a resolution than an episode number.
        if matches!(number, 480 | 720 | 1080)
            && parser.elements.insert(ElementKind::VideoResolution, value)
        {
            parser.claim(index, ElementKind::VideoResolution);
        }
    }
}

/// Pass: drop elements that are really another element re-absorbed into the
/// episode title.
fn validate_elements(parser: &mut Parser<'_>) {
    let Some(episode_title) = parser
        .elements
        .get(ElementKind::EpisodeTitle)
        .map(str::to_string)
    else {
        return;
    };
    let anime_types: Vec<String> = parser
        .elements
        .get_all(ElementKind::AnimeType)
        .into_iter()
        .map(str::to_string)
        .collect();

    for anime_type in anime_types {
        if !episode_title.contains(anime_type.as_str()) {
            continue;
        }
        if episode_title.len() == anime_type.len() {
            parser.elements.remove_kind(ElementKind::EpisodeTitle);
        } else if parser.dictionary.contains(
            ElementKind::AnimeType,
            &KeywordDictionary::normalize(&anime_type),
        ) {
            parser.elements.remove_value(ElementKind::AnimeType, &anime_type);
        }
    }
}
