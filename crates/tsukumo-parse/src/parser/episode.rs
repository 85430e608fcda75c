use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{volume, Parser};
use crate::elements::ElementKind;
use crate::keyword::KeywordDictionary;
use crate::text::{
    contains_digit, ends_with_digit, is_dash, is_numeric, starts_with_digit, to_float, to_int,
};
use crate::token::{
    find_next_token, find_prev_token, is_token_isolated, Token, TokenFlags, TokenKind,
};

/// Anything above this is more likely a year.
const EPISODE_NUMBER_MAX: f64 = 1899.0;

fn is_valid_episode_number(number: &str) -> bool {
    to_float(number) <= EPISODE_NUMBER_MAX
}

/// A whole-token episode pattern.
struct EpisodePattern {
    name: &'static str,
    regex: &'static str,
    /// Gate on whether the word starts / ends with a digit.
    shape: fn(bool, bool) -> bool,
    apply: fn(&mut Parser<'_>, &Captures<'_>, usize) -> bool,
}

/// Tried in order; the first pattern that applies wins.
static EPISODE_PATTERNS: &[EpisodePattern] = &[
    // "01v2"
    EpisodePattern {
        name: "single",
        regex: r"^(\d{1,4})[vV](\d)$",
        shape: |front, back| front && back,
        apply: apply_single,
    },
    // "01-02", "03-05v2"
    EpisodePattern {
        name: "multi",
        regex: r"^(\d{1,4})(?:[vV](\d))?[-~&+](\d{1,4})(?:[vV](\d))?$",
        shape: |front, back| front && back,
        apply: apply_multi,
    },
    // "2x01", "S01E03", "S01-02xE001-150"
    EpisodePattern {
        name: "season_and_episode",
        regex: r"(?i)^S?(\d{1,2})(?:-S?(\d{1,2}))?(?:x|[ ._\-x]?E)(\d{1,4})(?:-E?(\d{1,4}))?(?:[vV](\d))?$",
        shape: |_, back| back,
        apply: apply_season_and_episode,
    },
    // "ED1", "OP4a", "OVA2"
    EpisodePattern {
        name: "type_and_episode",
        regex: r"^([^0-9]+)([0-9].*)$",
        shape: |front, _| !front,
        apply: apply_type_and_episode,
    },
    // "07.5"
    EpisodePattern {
        name: "fractional",
        regex: r"^\d+\.5$",
        shape: |front, back| front && back,
        apply: apply_whole,
    },
    // "4a", "111C"
    EpisodePattern {
        name: "partial",
        regex: r"^\d+[a-cA-C]$",
        shape: |front, back| front && !back,
        apply: apply_whole,
    },
    // "#01", "#02-03v2"
    EpisodePattern {
        name: "number_sign",
        regex: r"^#(\d{1,4})(?:[-~&+](\d{1,4}))?(?:[vV](\d))?$",
        shape: |_, back| back,
        apply: apply_number_sign,
    },
    // "01話"
    EpisodePattern {
        name: "japanese_counter",
        regex: r"^(\d{1,4})\u{8A71}$",
        shape: |front, _| front,
        apply: apply_japanese_counter,
    },
];

static EPISODE_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    EPISODE_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern.regex).unwrap())
        .collect()
});

/// Pass: find the episode number among the unclaimed tokens with digits.
pub(super) fn search_for_episode_number(parser: &mut Parser<'_>) {
    if !parser.options.parse_episode_number {
        return;
    }
    let candidates: Vec<usize> = (0..parser.tokens.len())
        .filter(|&i| parser.tokens[i].is_unknown() && contains_digit(&parser.tokens[i].text))
        .collect();
    if candidates.is_empty() {
        return;
    }

    parser.found_episode_keywords = parser.elements.contains(ElementKind::EpisodeNumber);

    // A token matching a known pattern has to be the episode number.
    if search_for_episode_patterns(parser, &candidates) {
        return;
    }
    // Already found through a prefix keyword.
    if parser.elements.contains(ElementKind::EpisodeNumber) {
        return;
    }

    let numbers: Vec<usize> = candidates
        .into_iter()
        .filter(|&i| parser.tokens[i].is_unknown() && is_numeric(&parser.tokens[i].text))
        .collect();
    if numbers.is_empty() {
        return;
    }

    type Fallback = fn(&mut Parser<'_>, &[usize]) -> bool;
    const FALLBACKS: &[(&str, Fallback)] = &[
        // "01 (176)", "29 (04)"
        ("equivalent", search_for_equivalent_numbers),
        // " - 08"
        ("separated", search_for_separated_numbers),
        // "[12]", "(2006)"
        ("isolated", search_for_isolated_numbers),
        ("last", search_for_last_number),
    ];
    for &(name, fallback) in FALLBACKS {
        if fallback(parser, &numbers) {
            tracing::trace!(strategy = name, "Episode number found");
            return;
        }
    }
}

fn search_for_episode_patterns(parser: &mut Parser<'_>, candidates: &[usize]) -> bool {
    for &index in candidates {
        if !parser.tokens[index].is_unknown() {
            continue;
        }
        let text = parser.tokens[index].text.clone();

        if !starts_with_digit(&text) {
            // "EP.1", "Vol.1"
            if number_comes_after_prefix(parser, ElementKind::EpisodePrefix, index) {
                return true;
            }
            if number_comes_after_prefix(parser, ElementKind::VolumePrefix, index) {
                continue;
            }
        } else if number_comes_before_another_number(parser, index) {
            // "8 & 10", "01 of 24"
            return true;
        }

        if match_episode_patterns(parser, &text, index) {
            return true;
        }
    }
    false
}

/// A prefix keyword glued to its number, e.g. "EP01" or "Vol.3".
fn number_comes_after_prefix(parser: &mut Parser<'_>, kind: ElementKind, index: usize) -> bool {
    let text = &parser.tokens[index].text;
    let Some(number_begin) = text.find(|c: char| c.is_ascii_digit()) else {
        return false;
    };
    let prefix = KeywordDictionary::normalize(&text[..number_begin]);
    if !parser.dictionary.contains(kind, &prefix) {
        return false;
    }
    let number = text[number_begin..].to_string();
    parser.tokens[index].keyword = Some(kind);

    match kind {
        ElementKind::EpisodePrefix => {
            if !match_episode_patterns(parser, &number, index) {
                set_episode_number(parser, &number, index);
            }
        }
        ElementKind::VolumePrefix => {
            if !volume::match_volume_patterns(parser, &number, index) {
                volume::set_volume_number(parser, &number, index, false);
            }
        }
        _ => return false,
    }
    true
}

fn number_comes_before_another_number(parser: &mut Parser<'_>, index: usize) -> bool {
    let tokens = &parser.tokens;
    let Some(separator) = find_next_token(tokens, index, TokenFlags::NOT_DELIMITER) else {
        return false;
    };
    let separator_text = tokens[separator].text.as_str();
    let both = if separator_text == "&" {
        true
    } else if separator_text.eq_ignore_ascii_case("of") {
        false
    } else {
        return false;
    };
    let Some(other) = find_next_token(tokens, separator, TokenFlags::NOT_DELIMITER) else {
        return false;
    };
    if !is_numeric(&tokens[other].text) {
        return false;
    }

    let number = tokens[index].text.clone();
    let other_number = tokens[other].text.clone();
    if !set_episode_number(parser, &number, index) {
        return false;
    }
    if both {
        set_episode_number(parser, &other_number, other);
    }
    parser.claim(separator, ElementKind::EpisodeNumber);
    parser.claim(other, ElementKind::EpisodeNumber);
    true
}

/// Try the pattern table on `word`. `index` is the token the word came from.
pub(super) fn match_episode_patterns(parser: &mut Parser<'_>, word: &str, index: usize) -> bool {
    // Every pattern has at least one non-digit.
    if is_numeric(word) {
        return false;
    }
    let word = word.trim_matches([' ', '-']);
    if word.is_empty() {
        return false;
    }
    let front = starts_with_digit(word);
    let back = ends_with_digit(word);

    for (pattern, regex) in EPISODE_PATTERNS.iter().zip(EPISODE_REGEXES.iter()) {
        if !(pattern.shape)(front, back) {
            continue;
        }
        let Some(captures) = regex.captures(word) else {
            continue;
        };
        if (pattern.apply)(parser, &captures, index) {
            tracing::trace!(pattern = pattern.name, word, "Episode pattern matched");
            return true;
        }
    }
    false
}

fn insert_release_version(parser: &mut Parser<'_>, captures: &Captures<'_>, group: usize) {
    if let Some(version) = captures.get(group) {
        parser.elements.insert(ElementKind::ReleaseVersion, version.as_str());
    }
}

fn apply_single(parser: &mut Parser<'_>, captures: &Captures<'_>, index: usize) -> bool {
    if !is_valid_episode_number(&captures[1]) {
        return false;
    }
    set_episode_number(parser, &captures[1], index);
    insert_release_version(parser, captures, 2);
    true
}

fn apply_multi(parser: &mut Parser<'_>, captures: &Captures<'_>, index: usize) -> bool {
    let lower = &captures[1];
    let upper = &captures[3];
    // Avoid "009-1" or "5-2"
    if to_int(lower) >= to_int(upper) || !is_valid_episode_number(upper) {
        return false;
    }
    if !set_episode_number(parser, lower, index) {
        return false;
    }
    set_episode_number(parser, upper, index);
    insert_release_version(parser, captures, 2);
    insert_release_version(parser, captures, 4);
    true
}

fn apply_season_and_episode(
    parser: &mut Parser<'_>,
    captures: &Captures<'_>,
    index: usize,
) -> bool {
    let episodes = [captures.get(3), captures.get(4)];
    if to_int(&captures[1]) == 0
        || episodes
            .iter()
            .flatten()
            .any(|episode| !is_valid_episode_number(episode.as_str()))
    {
        return false;
    }
    parser.elements.insert(ElementKind::AnimeSeason, &captures[1]);
    if let Some(season) = captures.get(2) {
        parser.elements.insert(ElementKind::AnimeSeason, season.as_str());
    }
    set_episode_number(parser, &captures[3], index);
    if let Some(episode) = captures.get(4) {
        set_episode_number(parser, episode.as_str(), index);
    }
    insert_release_version(parser, captures, 5);
    true
}

/// An anime type keyword glued to a number. The token is split in two.
fn apply_type_and_episode(parser: &mut Parser<'_>, captures: &Captures<'_>, index: usize) -> bool {
    let prefix = &captures[1];
    let number = &captures[2];
    let Some(keyword) = parser.dictionary.lookup(
        &KeywordDictionary::normalize(prefix),
        Some(ElementKind::AnimeType),
    ) else {
        return false;
    };
    if !match_episode_patterns(parser, number, index)
        && !set_episode_number(parser, number, index)
    {
        return false;
    }
    parser.elements.insert(ElementKind::AnimeType, prefix);

    let token = &parser.tokens[index];
    let Some(position) = token.text.find(prefix) else {
        return true;
    };
    let split = position + prefix.len();
    let head = token.text[..split].to_string();
    let enclosed = token.enclosed;
    parser.tokens[index].text.replace_range(..split, "");

    let kind = if keyword.is_identifiable() {
        TokenKind::Identifier
    } else {
        TokenKind::Unknown
    };
    let mut head = Token::new(kind, head, enclosed);
    head.keyword = Some(ElementKind::AnimeType);
    if keyword.is_identifiable() {
        head.element = Some(ElementKind::AnimeType);
    }
    parser.tokens.insert(index, head);
    true
}

/// Patterns whose whole match is the episode number.
fn apply_whole(parser: &mut Parser<'_>, captures: &Captures<'_>, index: usize) -> bool {
    set_episode_number(parser, &captures[0], index)
}

fn apply_number_sign(parser: &mut Parser<'_>, captures: &Captures<'_>, index: usize) -> bool {
    if captures
        .get(2)
        .is_some_and(|upper| !is_valid_episode_number(upper.as_str()))
    {
        return false;
    }
    if !set_episode_number(parser, &captures[1], index) {
        return false;
    }
    if let Some(upper) = captures.get(2) {
        set_episode_number(parser, upper.as_str(), index);
    }
    insert_release_version(parser, captures, 3);
    true
}

fn apply_japanese_counter(parser: &mut Parser<'_>, captures: &Captures<'_>, index: usize) -> bool {
    if !is_valid_episode_number(&captures[1]) {
        return false;
    }
    set_episode_number(parser, &captures[1], index);
    true
}

/// Record an episode number found in token `index`. Numbers above
/// [`EPISODE_NUMBER_MAX`] are rejected.
///
/// When a prefix keyword already gave an episode number, the larger of the
/// two becomes the alternative number and an equal one is dropped.
pub(super) fn set_episode_number(parser: &mut Parser<'_>, number: &str, index: usize) -> bool {
    if !is_valid_episode_number(number) {
        return false;
    }
    parser.claim(index, ElementKind::EpisodeNumber);

    let mut kind = ElementKind::EpisodeNumber;
    if parser.found_episode_keywords {
        if let Some(existing) = parser.elements.get(ElementKind::EpisodeNumber) {
            match to_int(number).cmp(&to_int(existing)) {
                Ordering::Greater => kind = ElementKind::EpisodeNumberAlt,
                Ordering::Less => {
                    if !parser
                        .elements
                        .relabel(ElementKind::EpisodeNumber, ElementKind::EpisodeNumberAlt)
                    {
                        return false;
                    }
                }
                Ordering::Equal => return false,
            }
        }
    }
    parser.elements.insert(kind, number)
}

fn set_alternative_episode_number(parser: &mut Parser<'_>, number: &str, index: usize) {
    if parser.elements.insert(ElementKind::EpisodeNumberAlt, number) {
        parser.claim(index, ElementKind::EpisodeNumberAlt);
    }
}

/// "08 (176)": a number followed by a bracket-isolated number. The smaller
/// one is the episode number.
fn search_for_equivalent_numbers(parser: &mut Parser<'_>, numbers: &[usize]) -> bool {
    for &index in numbers {
        let tokens = &parser.tokens;
        if is_token_isolated(tokens, index) || !is_valid_episode_number(&tokens[index].text) {
            continue;
        }
        let Some(bracket) = find_next_token(tokens, index, TokenFlags::NOT_DELIMITER)
            .filter(|&i| tokens[i].is_bracket())
        else {
            continue;
        };
        let Some(next) = find_next_token(
            tokens,
            bracket,
            TokenFlags::ENCLOSED | TokenFlags::NOT_DELIMITER,
        )
        .filter(|&i| tokens[i].is_unknown()) else {
            continue;
        };
        if !is_token_isolated(tokens, next)
            || !is_numeric(&tokens[next].text)
            || !is_valid_episode_number(&tokens[next].text)
        {
            continue;
        }

        let (low, high) = if to_int(&tokens[next].text) < to_int(&tokens[index].text) {
            (next, index)
        } else {
            (index, next)
        };
        let number = tokens[low].text.clone();
        let alternative = tokens[high].text.clone();
        set_episode_number(parser, &number, low);
        set_alternative_episode_number(parser, &alternative, high);
        return true;
    }
    false
}

fn search_for_separated_numbers(parser: &mut Parser<'_>, numbers: &[usize]) -> bool {
    for &index in numbers {
        let tokens = &parser.tokens;
        let Some(prev) = find_prev_token(tokens, index, TokenFlags::NOT_DELIMITER) else {
            continue;
        };
        if !tokens[prev].is_unknown() || !is_dash(&tokens[prev].text) {
            continue;
        }
        let number = tokens[index].text.clone();
        if set_episode_number(parser, &number, index) {
            parser.claim(prev, ElementKind::EpisodeNumber);
            return true;
        }
    }
    false
}

fn search_for_isolated_numbers(parser: &mut Parser<'_>, numbers: &[usize]) -> bool {
    for &index in numbers {
        let tokens = &parser.tokens;
        if !tokens[index].enclosed || !is_token_isolated(tokens, index) {
            continue;
        }
        let number = tokens[index].text.clone();
        if set_episode_number(parser, &number, index) {
            return true;
        }
    }
    false
}

/// Last resort: the last number that follows the title.
fn search_for_last_number(parser: &mut Parser<'_>, numbers: &[usize]) -> bool {
    for &index in numbers.iter().rev() {
        let tokens = &parser.tokens;
        // The title comes first.
        if index == 0 || tokens[index].enclosed {
            continue;
        }
        if tokens[..index]
            .iter()
            .all(|t| t.enclosed || t.is_delimiter())
        {
            continue;
        }
        // "Movie 2", "Part 2"
        if let Some(prev) = find_prev_token(tokens, index, TokenFlags::NOT_DELIMITER) {
            let prev = &tokens[prev];
            let word = prev.text.as_str();
            if prev.is_unknown()
                && (word.eq_ignore_ascii_case("Movie") || word.eq_ignore_ascii_case("Part"))
            {
                continue;
            }
        }
        let number = tokens[index].text.clone();
        if set_episode_number(parser, &number, index) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use crate::elements::ElementKind;
    use crate::keyword::KeywordDictionary;
    use crate::options::Options;
    use crate::parser::{parse, parse_with, ParseResult};

    fn episode_numbers(result: &ParseResult) -> Vec<&str> {
        result.elements.get_all(ElementKind::EpisodeNumber)
    }

    fn parse_without_dash(input: &str) -> ParseResult {
        let options = Options {
            allowed_delimiters: " _.&+,|".to_string(),
            ..Options::default()
        };
        parse_with(input, &options, KeywordDictionary::standard())
    }

    #[test]
    fn test_single_with_version() {
        let r = parse("Title - 12v3.mkv");
        assert_eq!(episode_numbers(&r), vec!["12"]);
        assert_eq!(r.get(ElementKind::ReleaseVersion), Some("3"));
    }

    #[test]
    fn test_multi_episode_range() {
        let r = parse_without_dash("Title 01-12 [BD].mkv");
        assert_eq!(episode_numbers(&r), vec!["01", "12"]);
        assert_eq!(r.get(ElementKind::Title), Some("Title"));
    }

    #[test]
    fn test_multi_rejects_descending_range() {
        let r = parse_without_dash("Title 009-1.mkv");
        assert!(episode_numbers(&r).is_empty());
    }

    #[test]
    fn test_season_and_episode() {
        let r = parse("Show S01E03.mkv");
        assert_eq!(r.get(ElementKind::AnimeSeason), Some("01"));
        assert_eq!(episode_numbers(&r), vec!["03"]);
        assert_eq!(r.get(ElementKind::Title), Some("Show"));

        let r = parse("Show 2x05.mkv");
        assert_eq!(r.get(ElementKind::AnimeSeason), Some("2"));
        assert_eq!(episode_numbers(&r), vec!["05"]);
    }

    #[test]
    fn test_season_zero_rejected() {
        let r = parse("Show S00E03.mkv");
        assert_eq!(r.get(ElementKind::AnimeSeason), None);
    }

    #[test]
    fn test_type_and_episode_splits_token() {
        let r = parse("[Group] Title OVA2.mkv");
        assert_eq!(episode_numbers(&r), vec!["2"]);
        assert_eq!(r.get(ElementKind::AnimeType), Some("OVA"));
        let texts: Vec<_> = r.tokens.iter().map(|t| t.text.as_str()).collect();
        assert!(texts.ends_with(&["OVA", "2"]));
    }

    #[test]
    fn test_fractional() {
        let r = parse("Title - 07.5 [720p].mkv");
        assert_eq!(episode_numbers(&r), vec!["07.5"]);
    }

    #[test]
    fn test_partial() {
        let r = parse("Title 4a.mkv");
        assert_eq!(episode_numbers(&r), vec!["4a"]);
        assert_eq!(r.get(ElementKind::Title), Some("Title"));
    }

    #[test]
    fn test_number_sign() {
        let r = parse("Title #02.mkv");
        assert_eq!(episode_numbers(&r), vec!["02"]);
    }

    #[test]
    fn test_japanese_counter() {
        let r = parse("タイトル 第01話.mkv");
        assert_eq!(episode_numbers(&r), vec!["01"]);
        assert_eq!(r.get(ElementKind::Title), Some("タイトル"));
    }

    #[test]
    fn test_glued_prefix() {
        let r = parse("Title EP01.mkv");
        assert_eq!(episode_numbers(&r), vec!["01"]);
        assert_eq!(r.get(ElementKind::Title), Some("Title"));
    }

    #[test]
    fn test_number_and_number() {
        let r = parse("Title 08 & 10.mkv");
        assert_eq!(episode_numbers(&r), vec!["08", "10"]);

        let r = parse("Title 01 of 24.mkv");
        assert_eq!(episode_numbers(&r), vec!["01"]);
    }

    #[test]
    fn test_equivalent_numbers() {
        let r = parse("[Group] Title - 08 (176) [Info].mkv");
        assert_eq!(r.get(ElementKind::EpisodeNumber), Some("08"));
        assert_eq!(r.get(ElementKind::EpisodeNumberAlt), Some("176"));
    }

    #[test]
    fn test_isolated_enclosed_number() {
        let r = parse("[Group] Title [12].mkv");
        assert_eq!(episode_numbers(&r), vec!["12"]);
    }

    #[test]
    fn test_last_number() {
        let r = parse("Title 13.mkv");
        assert_eq!(episode_numbers(&r), vec!["13"]);
    }

    #[test]
    fn test_last_number_skips_movie_and_part() {
        let r = parse("Title Movie 2.mkv");
        assert!(episode_numbers(&r).is_empty());
        let r = parse("Title Part 2.mkv");
        assert!(episode_numbers(&r).is_empty());
    }

    #[test]
    fn test_year_sized_number_rejected() {
        let r = parse("Title 2010.mkv");
        assert!(episode_numbers(&r).is_empty());
    }

    #[test]
    fn test_alternative_number_after_keyword() {
        let r = parse("Title Episode 12 - 01v2.mkv");
        assert_eq!(r.get(ElementKind::EpisodeNumber), Some("01"));
        assert_eq!(r.get(ElementKind::EpisodeNumberAlt), Some("12"));
    }

    #[test]
    fn test_larger_number_after_keyword_becomes_alternative() {
        let r = parse("Title Episode 01 - 12v2.mkv");
        assert_eq!(episode_numbers(&r), vec!["01"]);
        assert_eq!(r.get(ElementKind::EpisodeNumberAlt), Some("12"));
        assert_eq!(r.get(ElementKind::ReleaseVersion), Some("2"));
    }

    #[test]
    fn test_year_sized_numbers_rejected_everywhere() {
        assert!(episode_numbers(&parse("Title Episode 2010.mkv")).is_empty());
        assert!(episode_numbers(&parse("Title - 2010v2.mkv")).is_empty());
        assert!(episode_numbers(&parse("Title EP2010.mkv")).is_empty());

        let r = parse("Title S01E2000.mkv");
        assert!(episode_numbers(&r).is_empty());
        assert_eq!(r.get(ElementKind::AnimeSeason), None);
    }

    #[test]
    fn test_equal_number_after_keyword_not_duplicated() {
        let r = parse("Title Episode 12 - 12v2.mkv");
        assert_eq!(episode_numbers(&r), vec!["12"]);
        assert_eq!(r.get(ElementKind::EpisodeNumberAlt), None);
    }

    #[test]
    fn test_disabled() {
        let options = Options {
            parse_episode_number: false,
            ..Options::default()
        };
        let r = parse_with("Title - 05.mkv", &options, KeywordDictionary::standard());
        assert!(episode_numbers(&r).is_empty());
    }
}
