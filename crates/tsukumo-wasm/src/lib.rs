use wasm_bindgen::prelude::*;

use tsukumo_parse::{KeywordDictionary, Options};

/// Parse with default options. Returns the result as JSON.
#[wasm_bindgen]
pub fn parse_filename(input: &str) -> String {
    let result = tsukumo_parse::parse(input);
    serde_json::to_string(&result).unwrap_or_else(|_| "{}".to_string())
}

/// Parse with options given as a JSON object; missing keys keep their
/// defaults.
#[wasm_bindgen]
pub fn parse_filename_with(input: &str, options_json: &str) -> Result<String, JsError> {
    let options: Options = serde_json::from_str(options_json)?;
    let result = tsukumo_parse::parse_with(input, &options, KeywordDictionary::standard());
    Ok(serde_json::to_string(&result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filename() {
        let json = parse_filename("[Group] Title - 01.mkv");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["elements"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["kind"] == "release_group" && e["value"] == "Group"));
    }
}
