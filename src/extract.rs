//! Zone extraction from the bulletin's delimited text blocks.

use regex::Regex;
use std::sync::OnceLock;

/// Block separator the source bulletin places between zone sections.
pub const BLOCK_DELIMITER: &str = "$$";

fn blank_run_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

/// Return the first `$$`-delimited block matching the zone pattern.
///
/// Runs of three or more newlines collapse to one blank line and outer
/// whitespace is trimmed. `None` means the zone is absent from this product
/// issue, a normal outcome the renderer answers with a placeholder, not an
/// error. Later matching blocks are ignored; products carry at most one
/// block per zone.
pub fn extract_zone_section(full_text: &str, zone: &Regex) -> Option<String> {
    full_text
        .split(BLOCK_DELIMITER)
        .find(|block| zone.is_match(block))
        .map(|block| {
            blank_run_pattern()
                .replace_all(block, "\n\n")
                .trim()
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::RegexBuilder;

    fn zone(token: &str) -> Regex {
        RegexBuilder::new(token).case_insensitive(true).build().unwrap()
    }

    #[test]
    fn test_extracts_matching_block() {
        let text = "ZONE A TEXT$$ CAZ340 FORECAST BODY $$ ZONE C TEXT";
        let section = extract_zone_section(text, &zone("CAZ340")).unwrap();
        assert_eq!(section, "CAZ340 FORECAST BODY");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let text = "ZONE A$$\ncaz340-041500-\nSan Luis Obispo County Beaches-\nSurf 3 to 5 ft.\n$$";
        let section = extract_zone_section(text, &zone("CAZ340")).unwrap();
        assert!(section.starts_with("caz340-041500-"));
        assert!(section.contains("Surf 3 to 5 ft."));
    }

    #[test]
    fn test_no_match_returns_none() {
        let text = "ZONE A TEXT$$ZONE B TEXT$$ZONE C TEXT";
        assert_eq!(extract_zone_section(text, &zone("CAZ340")), None);
    }

    #[test]
    fn test_first_match_wins() {
        let text = "CAZ340 FIRST$$CAZ340 SECOND";
        let section = extract_zone_section(text, &zone("CAZ340")).unwrap();
        assert_eq!(section, "CAZ340 FIRST");
    }

    #[test]
    fn test_blank_runs_collapse_to_one_blank_line() {
        let text = "CAZ340 HEADER\n\n\n\nSURF\n\n\nSWELL\n\nTIDES";
        let section = extract_zone_section(text, &zone("CAZ340")).unwrap();
        assert_eq!(section, "CAZ340 HEADER\n\nSURF\n\nSWELL\n\nTIDES");
    }

    #[test]
    fn test_outer_whitespace_is_trimmed() {
        let text = "before$$\n\n  CAZ340 BODY  \n\n$$after";
        let section = extract_zone_section(text, &zone("CAZ340")).unwrap();
        assert_eq!(section, "CAZ340 BODY");
    }

    #[test]
    fn test_delimiter_free_text_is_one_block() {
        let text = "CAZ340 ONLY BLOCK";
        let section = extract_zone_section(text, &zone("CAZ340")).unwrap();
        assert_eq!(section, "CAZ340 ONLY BLOCK");
    }

    #[test]
    fn test_zone_token_may_be_plain_text() {
        let text = "first$$San Luis Obispo County Beaches\nSurf low.$$last";
        let section = extract_zone_section(text, &zone("san luis obispo")).unwrap();
        assert!(section.starts_with("San Luis Obispo"));
    }
}
