use phf::phf_map;

use super::Parser;
use crate::elements::ElementKind;
use crate::text::is_numeric;
use crate::token::{find_next_token, find_prev_token, TokenFlags};

static ORDINALS: phf::Map<&'static str, &'static str> = phf_map! {
    "1st" => "1", "First" => "1",
    "2nd" => "2", "Second" => "2",
    "3rd" => "3", "Third" => "3",
    "4th" => "4", "Fourth" => "4",
    "5th" => "5", "Fifth" => "5",
    "6th" => "6", "Sixth" => "6",
    "7th" => "7", "Seventh" => "7",
    "8th" => "8", "Eighth" => "8",
    "9th" => "9", "Ninth" => "9",
};

/// "2nd Season" or "Season 2", around the season keyword at `index`.
pub(super) fn check_anime_season_keyword(parser: &mut Parser<'_>, index: usize) {
    let tokens = &parser.tokens;

    let ordinal = find_prev_token(tokens, index, TokenFlags::NOT_DELIMITER).and_then(|prev| {
        ORDINALS
            .get(tokens[prev].text.as_str())
            .map(|&number| (prev, index, number.to_string()))
    });
    let found = ordinal.or_else(|| {
        find_next_token(tokens, index, TokenFlags::NOT_DELIMITER)
            .filter(|&next| is_numeric(&tokens[next].text))
            .map(|next| (index, next, tokens[next].text.clone()))
    });

    let Some((first, second, number)) = found else {
        return;
    };
    parser.elements.insert(ElementKind::AnimeSeason, number);
    parser.claim(first, ElementKind::AnimeSeason);
    parser.claim(second, ElementKind::AnimeSeason);
}
