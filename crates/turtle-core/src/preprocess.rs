use unicode_normalization::UnicodeNormalization;

/// Normalize the text of one tile to the letter the game shows
pub fn normalize_tile_text(text: &str) -> String {
    let text = text.trim();

    if text.is_empty() {
        return String::new();
    }

    // Full-width and compatibility forms fold to plain letters
    text.nfkc()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize_tile_text("  A \n"), "a");
        assert_eq!(normalize_tile_text("   "), "");
    }

    #[test]
    fn folds_fullwidth_letters() {
        assert_eq!(normalize_tile_text("Ｑ"), "q");
    }
}
