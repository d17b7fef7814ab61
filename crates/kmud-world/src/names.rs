//! Display-name normalization.

/// Normalize a name for display: surrounding whitespace trimmed, inner runs
/// of whitespace collapsed to one space, and each word capitalized.
///
/// `"  rusty   SWORD "` becomes `"Rusty Sword"`.
pub fn format_name(name: &str) -> String {
    name.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_collapses_and_capitalizes() {
        assert_eq!(format_name("  rusty   SWORD "), "Rusty Sword");
        assert_eq!(format_name("the dark forest"), "The Dark Forest");
        assert_eq!(format_name("élan"), "Élan");
    }

    #[test]
    fn blank_names_stay_empty() {
        assert_eq!(format_name(""), "");
        assert_eq!(format_name("   "), "");
    }
}
