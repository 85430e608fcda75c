use std::ops::Range;

use crate::elements::Elements;
use crate::keyword::KeywordDictionary;
use crate::options::Options;
use crate::token::{find_next_token, find_prev_token, Token, TokenFlags, TokenKind};
use crate::text::is_numeric;

/// Opening/closing bracket pairs, including CJK and fullwidth brackets.
const BRACKETS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('\u{300C}', '\u{300D}'), // 「」
    ('\u{300E}', '\u{300F}'), // 『』
    ('\u{3010}', '\u{3011}'), // 【】
    ('\u{FF08}', '\u{FF09}'), // （）
];

fn closing_bracket(c: char) -> Option<char> {
    BRACKETS
        .iter()
        .find(|(open, _)| *open == c)
        .map(|(_, close)| *close)
}

/// Split a filename into tokens.
///
/// Pre-identified keywords found along the way are inserted into `elements`.
/// Concatenating the text of the returned tokens reproduces `filename`.
pub fn tokenize(
    filename: &str,
    options: &Options,
    dictionary: &KeywordDictionary,
    elements: &mut Elements,
) -> Vec<Token> {
    let mut tokenizer = Tokenizer {
        filename,
        options,
        dictionary,
        elements,
        tokens: Vec::new(),
    };
    tokenizer.tokenize_by_brackets();
    repair_delimiters(&mut tokenizer.tokens);
    tracing::trace!(count = tokenizer.tokens.len(), "Tokenized filename");
    tokenizer.tokens
}

struct Tokenizer<'a> {
    filename: &'a str,
    options: &'a Options,
    dictionary: &'a KeywordDictionary,
    elements: &'a mut Elements,
    tokens: Vec<Token>,
}

impl Tokenizer<'_> {
    /// Only the partner of the currently open bracket closes it, so a `(`
    /// inside `[...]` is plain text.
    fn tokenize_by_brackets(&mut self) {
        let filename = self.filename;
        let mut matching: Option<char> = None;
        let mut start = 0;

        for (i, c) in filename.char_indices() {
            let kind = match matching {
                None => match closing_bracket(c) {
                    Some(close) => {
                        matching = Some(close);
                        TokenKind::OpenBracket
                    }
                    None => continue,
                },
                Some(close) if c == close => {
                    matching = None;
                    TokenKind::CloseBracket
                }
                Some(_) => continue,
            };

            self.tokenize_by_preidentified(start..i, kind == TokenKind::CloseBracket);
            let end = i + c.len_utf8();
            self.tokens.push(Token::new(kind, &filename[i..end], true));
            start = end;
        }

        self.tokenize_by_preidentified(start..filename.len(), matching.is_some());
    }

    fn tokenize_by_preidentified(&mut self, range: Range<usize>, enclosed: bool) {
        if range.is_empty() {
            return;
        }
        let filename = self.filename;
        let mut cursor = range.start;

        for hit in self.dictionary.peek(&filename[range.clone()]) {
            let begin = range.start + hit.range.start;
            let end = range.start + hit.range.end;
            self.tokenize_by_delimiters(cursor..begin, enclosed);

            let mut token = Token::new(TokenKind::Identifier, &filename[begin..end], enclosed);
            token.keyword = Some(hit.kind);
            if self.elements.insert(hit.kind, hit.keyword) {
                token.element = Some(hit.kind);
            }
            self.tokens.push(token);
            cursor = end;
        }

        self.tokenize_by_delimiters(cursor..range.end, enclosed);
    }

    fn tokenize_by_delimiters(&mut self, range: Range<usize>, enclosed: bool) {
        if range.is_empty() {
            return;
        }
        let filename = self.filename;
        let mut start = range.start;

        for (offset, c) in filename[range.clone()].char_indices() {
            if !self.options.is_allowed_delimiter(c) {
                continue;
            }
            let at = range.start + offset;
            if at > start {
                self.tokens.push(Token::new(TokenKind::Unknown, &filename[start..at], enclosed));
            }
            let end = at + c.len_utf8();
            self.tokens.push(Token::new(TokenKind::Delimiter, &filename[at..end], enclosed));
            start = end;
        }

        if start < range.end {
            self.tokens.push(Token::new(
                TokenKind::Unknown,
                &filename[start..range.end],
                enclosed,
            ));
        }
    }
}

fn unknown_at(tokens: &[Token], index: Option<usize>) -> bool {
    index.is_some_and(|i| tokens[i].is_unknown())
}

fn delimiter_at(tokens: &[Token], index: Option<usize>) -> Option<char> {
    index
        .filter(|&i| tokens[i].is_delimiter())
        .and_then(|i| tokens[i].first_char())
}

/// One-character free text other than a dash, e.g. the letters of "a.b.c".
fn single_character_at(tokens: &[Token], index: Option<usize>) -> bool {
    index.is_some_and(|i| {
        let mut chars = tokens[i].text.chars();
        tokens[i].is_unknown()
            && matches!((chars.next(), chars.next()), (Some(c), None) if c != '-')
    })
}

/// Move the text of `from` onto the end of `to` and tombstone `from`.
fn append_token(tokens: &mut [Token], from: usize, to: usize) {
    let text = std::mem::take(&mut tokens[from].text);
    tokens[to].text.push_str(&text);
    tokens[from].kind = TokenKind::Invalid;
}

/// Undo splits that the delimiter pass got wrong, then drop the tombstones.
fn repair_delimiters(tokens: &mut Vec<Token>) {
    for index in 0..tokens.len() {
        if !tokens[index].is_delimiter() {
            continue;
        }
        let Some(delimiter) = tokens[index].first_char() else {
            continue;
        };
        let prev = find_prev_token(tokens, index, TokenFlags::VALID);
        let mut next = find_next_token(tokens, index, TokenFlags::VALID);

        // Keep abbreviations, group names and keywords spelled with
        // single characters together.
        if delimiter != ' ' && delimiter != '_' {
            if let Some(p) = prev.filter(|_| single_character_at(tokens, prev)) {
                append_token(tokens, index, p);
                while let Some(n) = next.filter(|&n| tokens[n].is_unknown()) {
                    append_token(tokens, n, p);
                    next = find_next_token(tokens, n, TokenFlags::VALID);
                    if let Some(d) = next.filter(|_| delimiter_at(tokens, next) == Some(delimiter))
                    {
                        append_token(tokens, d, p);
                        next = find_next_token(tokens, d, TokenFlags::VALID);
                    }
                }
                continue;
            }
            if let (Some(p), Some(n)) = (prev, next) {
                if tokens[p].is_unknown() && single_character_at(tokens, next) {
                    append_token(tokens, index, p);
                    append_token(tokens, n, p);
                    continue;
                }
            }
        }

        // Adjacent delimiters.
        if unknown_at(tokens, prev) {
            if let (Some(p), Some(next_delimiter)) = (prev, delimiter_at(tokens, next)) {
                if delimiter != next_delimiter
                    && delimiter != ','
                    && matches!(next_delimiter, ' ' | '_')
                {
                    append_token(tokens, index, p);
                }
            }
        } else if let (Some(prev_delimiter), Some(next_delimiter)) =
            (delimiter_at(tokens, prev), delimiter_at(tokens, next))
        {
            // "&" in "_&_"
            if prev_delimiter == next_delimiter && prev_delimiter != delimiter {
                tokens[index].kind = TokenKind::Unknown;
            }
        }

        // "01+02"
        if matches!(delimiter, '&' | '+') {
            if let (Some(p), Some(n)) = (prev, next) {
                if tokens[index].is_delimiter()
                    && tokens[p].is_unknown()
                    && tokens[n].is_unknown()
                    && is_numeric(&tokens[p].text)
                    && is_numeric(&tokens[n].text)
                {
                    append_token(tokens, index, p);
                    append_token(tokens, n, p);
                }
            }
        }
    }

    tokens.retain(|token| token.kind != TokenKind::Invalid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;

    fn run_with(input: &str, options: &Options) -> (Vec<Token>, Elements) {
        let mut elements = Elements::new();
        let tokens = tokenize(
            input,
            options,
            KeywordDictionary::standard(),
            &mut elements,
        );
        (tokens, elements)
    }

    fn run(input: &str) -> Vec<Token> {
        run_with(input, &Options::default()).0
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_basic_tokenization() {
        let tokens = run("[SubGroup] Anime Title - 05 [1080p]");
        assert_eq!(tokens[0].kind, TokenKind::OpenBracket);
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].text, "SubGroup");
        assert!(tokens[1].enclosed);
        assert_eq!(tokens[2].kind, TokenKind::CloseBracket);
        assert!(tokens[2].enclosed);
        // After the bracket there's a space
        assert_eq!(tokens[3].kind, TokenKind::Delimiter);
        assert!(!tokens[3].enclosed);
        assert_eq!(tokens[4].text, "Anime");
        assert!(!tokens[4].enclosed);
    }

    #[test]
    fn test_lossless_partition() {
        for input in [
            "[TaigaSubs]_Toradora!_(2008)_-_01v2_-_Tiger_and_Dragon_[1280x720_H.264_FLAC][1234ABCD]",
            "【GroupName】 Title (（x）) - 01",
            "a.b.c Title & Co_&_01+02",
            "Title [Unterminated",
        ] {
            let tokens = run(input);
            let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
            assert_eq!(joined, input);
            assert!(tokens.iter().all(|t| t.kind != TokenKind::Invalid));
        }
    }

    #[test]
    fn test_cjk_brackets() {
        let tokens = run("【GroupName】 Title - 01");
        assert_eq!(tokens[0].kind, TokenKind::OpenBracket);
        assert_eq!(tokens[0].text, "【");
        assert_eq!(tokens[1].text, "GroupName");
        assert!(tokens[1].enclosed);
        assert_eq!(tokens[2].kind, TokenKind::CloseBracket);
    }

    #[test]
    fn test_only_matching_bracket_closes() {
        let tokens = run("[Group (x)] Title");
        assert_eq!(texts(&tokens), vec!["[", "Group", " ", "(x)", "]", " ", "Title"]);
        assert!(tokens[3].enclosed);
        assert_eq!(tokens[3].kind, TokenKind::Unknown);
    }

    #[test]
    fn test_unterminated_bracket_stays_enclosed() {
        let tokens = run("Title [Unterminated");
        let last = tokens.last().unwrap();
        assert_eq!(last.text, "Unterminated");
        assert!(last.enclosed);
        assert!(!tokens[0].enclosed);
    }

    #[test]
    fn test_dash_between_spaces_is_text() {
        let tokens = run("Title - 05");
        assert_eq!(texts(&tokens), vec!["Title", " ", "-", " ", "05"]);
        assert_eq!(tokens[2].kind, TokenKind::Unknown);
    }

    #[test]
    fn test_ampersand_between_underscores_is_text() {
        let tokens = run("Tom_&_Jerry");
        assert_eq!(tokens[2].text, "&");
        assert_eq!(tokens[2].kind, TokenKind::Unknown);
    }

    #[test]
    fn test_single_characters_merge() {
        let tokens = run("a.b.c Title");
        assert_eq!(texts(&tokens), vec!["a.b.c", " ", "Title"]);
    }

    #[test]
    fn test_numeric_plus_merges() {
        let tokens = run("Title 01+02");
        assert_eq!(texts(&tokens), vec!["Title", " ", "01+02"]);
        assert_eq!(tokens[2].kind, TokenKind::Unknown);
    }

    #[test]
    fn test_preidentified_keywords() {
        let (tokens, elements) = run_with("Title_Dual Audio_x", &Options::default());
        let dual = tokens.iter().find(|t| t.text == "Dual Audio").unwrap();
        assert_eq!(dual.kind, TokenKind::Identifier);
        assert_eq!(dual.element, Some(ElementKind::AudioTerm));
        assert_eq!(elements.get(ElementKind::AudioTerm), Some("Dual Audio"));
    }

    #[test]
    fn test_custom_delimiters() {
        let options = Options {
            allowed_delimiters: " ".to_string(),
            ..Options::default()
        };
        let (tokens, _) = run_with("Title_Name 01", &options);
        assert_eq!(texts(&tokens), vec!["Title_Name", " ", "01"]);
    }

    #[test]
    fn test_delimiter_folds_into_previous_word() {
        assert_eq!(texts(&run("Title. 01")), vec!["Title.", " ", "01"]);
    }

    #[test]
    fn test_single_character_after_delimiter_merges() {
        assert_eq!(texts(&run("Title.a_01")), vec!["Title.a", "_", "01"]);
    }

    #[test]
    fn test_empty() {
        assert!(run("").is_empty());
    }
}
