/// Convert a search keyword to a name safe for directories and filenames
pub fn sanitize_keyword(keyword: &str) -> String {
    let mut name = keyword.trim().replace(
        ['/', '\\', ':', '?', '&', '=', '#', '%', '"', '*', '<', '>', '|'],
        "_",
    );

    // Limit length without splitting a multi-byte character
    if name.chars().count() > 60 {
        name = name.chars().take(60).collect();
    }

    if name.is_empty() {
        name = "untitled".to_string();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_characters_replaced() {
        assert_eq!(sanitize_keyword("a/b:c?d"), "a_b_c_d");
    }

    #[test]
    fn test_plain_keywords_unchanged() {
        assert_eq!(sanitize_keyword("cats"), "cats");
        assert_eq!(sanitize_keyword("고양이"), "고양이");
    }

    #[test]
    fn test_long_keyword_truncated_on_char_boundary() {
        let long: String = "어".repeat(100);
        let name = sanitize_keyword(&long);
        assert_eq!(name.chars().count(), 60);
    }

    #[test]
    fn test_blank_keyword_falls_back() {
        assert_eq!(sanitize_keyword("   "), "untitled");
    }
}
