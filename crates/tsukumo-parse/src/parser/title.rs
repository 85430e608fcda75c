use super::Parser;
use crate::elements::ElementKind;
use crate::text::{is_dash, is_mostly_latin};
use crate::token::{find_prev_token, find_token, TokenFlags};

/// Pass: the anime title is the first run of free text outside brackets,
/// up to the first identified token.
pub(super) fn search_for_anime_title(parser: &mut Parser<'_>) {
    let tokens = &parser.tokens;
    let mut enclosed = false;

    let begin = match find_token(tokens, 0, TokenFlags::NOT_ENCLOSED | TokenFlags::UNKNOWN) {
        Some(begin) => begin,
        None => {
            enclosed = true;
            match find_enclosed_title(parser) {
                Some(begin) => begin,
                None => return,
            }
        }
    };

    let tokens = &parser.tokens;
    let end_flags = if enclosed {
        TokenFlags::IDENTIFIER | TokenFlags::BRACKET
    } else {
        TokenFlags::IDENTIFIER
    };
    let mut end = find_token(tokens, begin, end_flags).unwrap_or(tokens.len());

    if !enclosed {
        // Stop at an open bracket that never closes before the end.
        let mut last_bracket = None;
        let mut bracket_open = false;
        for index in begin..end {
            if tokens[index].is_bracket() {
                last_bracket = Some(index);
                bracket_open = !bracket_open;
            }
        }
        if let Some(bracket) = last_bracket.filter(|_| bracket_open) {
            end = bracket;
        }

        // Drop trailing groups like "[Fansub]", but keep "(TV)".
        let mut prev = find_prev_token(tokens, end, TokenFlags::NOT_DELIMITER);
        while let Some(index) = prev.filter(|&i| {
            tokens[i].is_bracket() && tokens[i].first_char() != Some(')')
        }) {
            let Some(open) = find_prev_token(tokens, index, TokenFlags::BRACKET) else {
                break;
            };
            end = open;
            prev = find_prev_token(tokens, end, TokenFlags::NOT_DELIMITER);
        }
    }

    parser.build_element(ElementKind::Title, false, begin..end);
}

/// Everything is in brackets: take the first unknown token of the second
/// group, skipping groups that aren't mostly Latin text.
fn find_enclosed_title(parser: &Parser<'_>) -> Option<usize> {
    let tokens = &parser.tokens;
    let mut skipped_previous_group = false;
    let mut begin = find_token(tokens, 0, TokenFlags::UNKNOWN)?;
    loop {
        if skipped_previous_group && is_mostly_latin(&tokens[begin].text) {
            return Some(begin);
        }
        let bracket = find_token(tokens, begin, TokenFlags::BRACKET)?;
        begin = find_token(tokens, bracket, TokenFlags::UNKNOWN)?;
        skipped_previous_group = true;
    }
}

/// Pass: the release group is the first bracket group whose content is
/// still unknown.
pub(super) fn search_for_release_group(parser: &mut Parser<'_>) {
    if !parser.options.parse_release_group || parser.elements.contains(ElementKind::ReleaseGroup) {
        return;
    }
    let mut from = 0;
    loop {
        let tokens = &parser.tokens;
        let Some(begin) = find_token(tokens, from, TokenFlags::ENCLOSED | TokenFlags::UNKNOWN)
        else {
            return;
        };
        let Some(end) = find_token(tokens, begin, TokenFlags::BRACKET | TokenFlags::IDENTIFIER)
        else {
            return;
        };
        from = end;
        if !tokens[end].is_bracket() {
            continue;
        }
        // Only if it starts the group.
        if find_prev_token(tokens, begin, TokenFlags::NOT_DELIMITER)
            .is_some_and(|prev| !tokens[prev].is_bracket())
        {
            continue;
        }
        parser.build_element(ElementKind::ReleaseGroup, true, begin..end);
        return;
    }
}

/// Pass: free text after the episode number.
pub(super) fn search_for_episode_title(parser: &mut Parser<'_>) {
    if !parser.options.parse_episode_title || !parser.elements.contains(ElementKind::EpisodeNumber)
    {
        return;
    }
    let mut from = 0;
    loop {
        let tokens = &parser.tokens;
        let Some(begin) =
            find_token(tokens, from, TokenFlags::NOT_ENCLOSED | TokenFlags::UNKNOWN)
        else {
            return;
        };
        let end = find_token(tokens, begin, TokenFlags::BRACKET | TokenFlags::IDENTIFIER)
            .unwrap_or(tokens.len());
        from = end;
        // A lone dash
        if end - begin <= 2 && is_dash(&tokens[begin].text) {
            continue;
        }
        parser.build_element(ElementKind::EpisodeTitle, false, begin..end);
        return;
    }
}

#[cfg(test)]
mod tests {
    use crate::elements::ElementKind;
    use crate::keyword::KeywordDictionary;
    use crate::options::Options;
    use crate::parser::{parse, parse_with};

    #[test]
    fn test_trailing_group_dropped() {
        let r = parse("Title Name [Some Info].mkv");
        assert_eq!(r.get(ElementKind::Title), Some("Title Name"));
    }

    #[test]
    fn test_trailing_parentheses_kept() {
        let r = parse("Title Name (TV) - 03.mkv");
        assert_eq!(r.get(ElementKind::Title), Some("Title Name (TV)"));
    }

    #[test]
    fn test_unmatched_open_bracket() {
        let r = parse("Title (Extra");
        assert_eq!(r.get(ElementKind::Title), Some("Title"));
    }

    #[test]
    fn test_enclosed_title() {
        let r = parse("[Group] [Title Name] [01].mkv");
        assert_eq!(r.get(ElementKind::Title), Some("Title Name"));
        assert_eq!(r.get(ElementKind::ReleaseGroup), Some("Group"));
        assert_eq!(r.get(ElementKind::EpisodeNumber), Some("01"));
    }

    #[test]
    fn test_enclosed_title_skips_non_latin_group() {
        let r = parse("[Group][タイトル][Title Name][01].mkv");
        assert_eq!(r.get(ElementKind::Title), Some("Title Name"));
    }

    #[test]
    fn test_release_group_keeps_delimiters() {
        let r = parse("[Fansub_Group] Title - 02.mkv");
        assert_eq!(r.get(ElementKind::ReleaseGroup), Some("Fansub_Group"));
    }

    #[test]
    fn test_release_group_must_start_group() {
        let r = parse("Title - 02 [1080p Extra].mkv");
        assert_eq!(r.get(ElementKind::ReleaseGroup), None);
    }

    #[test]
    fn test_episode_title() {
        let r = parse("[Group] Title - 05 - The Beginning [720p].mkv");
        assert_eq!(r.get(ElementKind::Title), Some("Title"));
        assert_eq!(r.get(ElementKind::EpisodeNumber), Some("05"));
        assert_eq!(r.get(ElementKind::EpisodeTitle), Some("The Beginning"));
    }

    #[test]
    fn test_episode_title_needs_episode_number() {
        let r = parse("[Group] Title Name [720p].mkv");
        assert_eq!(r.get(ElementKind::EpisodeTitle), None);
    }

    #[test]
    fn test_episode_title_disabled() {
        let options = Options {
            parse_episode_title: false,
            ..Options::default()
        };
        let r = parse_with(
            "Title - 05 - The Beginning.mkv",
            &options,
            KeywordDictionary::standard(),
        );
        assert_eq!(r.get(ElementKind::EpisodeTitle), None);
    }
}
