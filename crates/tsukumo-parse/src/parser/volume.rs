use std::sync::LazyLock;

use regex::Regex;

use super::Parser;
use crate::elements::ElementKind;
use crate::text::{ends_with_digit, is_numeric, starts_with_digit, to_int};

const VOLUME_NUMBER_MAX: u32 = 20;

static RE_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[vV](\d)$").unwrap());

static RE_MULTI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[-~&+](\d{1,2})(?:[vV](\d))?$").unwrap());

/// "01v2" or a range like "01-03". A range is kept as one value.
pub(super) fn match_volume_patterns(parser: &mut Parser<'_>, word: &str, index: usize) -> bool {
    if is_numeric(word) {
        return false;
    }
    let word = word.trim_matches([' ', '-']);
    if !starts_with_digit(word) || !ends_with_digit(word) {
        return false;
    }

    if let Some(caps) = RE_SINGLE.captures(word) {
        set_volume_number(parser, &caps[1], index, false);
        parser.elements.insert(ElementKind::ReleaseVersion, &caps[2]);
        return true;
    }

    if let Some(caps) = RE_MULTI.captures(word) {
        let lower = &caps[1];
        let upper = &caps[2];
        if to_int(lower) >= to_int(upper) || to_int(lower) > VOLUME_NUMBER_MAX {
            return false;
        }
        if !set_volume_number(parser, &format!("{lower}-{upper}"), index, false) {
            return false;
        }
        if let Some(version) = caps.get(3) {
            parser.elements.insert(ElementKind::ReleaseVersion, version.as_str());
        }
        return true;
    }

    false
}

pub(super) fn set_volume_number(
    parser: &mut Parser<'_>,
    number: &str,
    index: usize,
    validate: bool,
) -> bool {
    if validate && to_int(number) > VOLUME_NUMBER_MAX {
        return false;
    }
    parser.claim(index, ElementKind::VolumeNumber);
    parser.elements.insert(ElementKind::VolumeNumber, number)
}

#[cfg(test)]
mod tests {
    use crate::elements::ElementKind;
    use crate::keyword::KeywordDictionary;
    use crate::options::Options;
    use crate::parser::{parse, parse_with};

    #[test]
    fn test_volume_prefix() {
        let r = parse("Title Vol 3.mkv");
        assert_eq!(r.get(ElementKind::VolumeNumber), Some("3"));
        assert_eq!(r.get(ElementKind::Title), Some("Title"));
    }

    #[test]
    fn test_glued_volume_prefix() {
        let r = parse("Title Vol3 - 05.mkv");
        assert_eq!(r.get(ElementKind::VolumeNumber), Some("3"));
        assert_eq!(r.get(ElementKind::EpisodeNumber), Some("05"));
    }

    #[test]
    fn test_volume_range() {
        let options = Options {
            allowed_delimiters: " _".to_string(),
            ..Options::default()
        };
        let r = parse_with("Title Vol.01-03.mkv", &options, KeywordDictionary::standard());
        assert_eq!(r.get(ElementKind::VolumeNumber), Some("01-03"));
        assert_eq!(r.elements.count(ElementKind::VolumeNumber), 1);
    }

    #[test]
    fn test_volume_with_version() {
        let r = parse("Title Vol 02v2.mkv");
        assert_eq!(r.get(ElementKind::VolumeNumber), Some("02"));
        assert_eq!(r.get(ElementKind::ReleaseVersion), Some("2"));
    }
}
