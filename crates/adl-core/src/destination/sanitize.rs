//! Turn a payload name into a single safe path component.

/// Name used when sanitizing leaves nothing usable.
pub const FALLBACK_NAME: &str = "asset";

/// Longest file name in bytes (Linux NAME_MAX).
pub const NAME_MAX: usize = 255;

/// Bytes kept free for a ` N` uniqueness suffix.
pub const SUFFIX_RESERVE: usize = 8;

/// Sanitizes a display name for use as one directory or file name.
///
/// - Replaces NUL, `/`, `\` and control characters with `_`
/// - Trims leading/trailing spaces and dots (no hidden folders, no `..`)
/// - Limits length to [`NAME_MAX`] bytes
///
/// Inner spaces are kept, so `"Office Chair"` stays readable on disk.
pub fn sanitize_component(name: &str) -> String {
    sanitize_component_within(name, NAME_MAX)
}

/// Like [`sanitize_component`], but at most `max_bytes` long so the caller
/// can still add a suffix.
pub fn sanitize_component_within(name: &str, max_bytes: usize) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

    let limited =
        truncate_bytes(trimmed, max_bytes).trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    if limited.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        limited.to_string()
    }
}

/// Longest prefix of `s` that is at most `max_bytes` long and ends on a char boundary.
pub fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut take = max_bytes;
    while take > 0 && !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(sanitize_component("Chair"), "Chair");
        assert_eq!(sanitize_component("Office Chair"), "Office Chair");
    }

    #[test]
    fn replaces_separators() {
        assert_eq!(sanitize_component("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_component("../../etc"), "_.._etc");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_component("  ..Lamp..  "), "Lamp");
    }

    #[test]
    fn empty_and_reserved_fall_back() {
        assert_eq!(sanitize_component(""), FALLBACK_NAME);
        assert_eq!(sanitize_component(".."), FALLBACK_NAME);
        assert_eq!(sanitize_component("   "), FALLBACK_NAME);
    }

    #[test]
    fn control_chars() {
        assert_eq!(sanitize_component("tab\tname\n"), "tab_name_");
    }

    #[test]
    fn long_names_are_capped_on_char_boundary() {
        let name = "é".repeat(200);
        let out = sanitize_component(&name);
        assert!(out.len() <= 255);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn within_leaves_room_for_suffix() {
        let out = sanitize_component_within(&"C".repeat(300), NAME_MAX - SUFFIX_RESERVE);
        assert_eq!(out.len(), NAME_MAX - SUFFIX_RESERVE);
        assert_eq!(sanitize_component_within("Lamp", 10), "Lamp");
    }

    #[test]
    fn truncation_drops_trailing_dots_and_spaces() {
        assert_eq!(sanitize_component_within("ab. cd", 4), "ab");
        assert_eq!(truncate_bytes("éé", 3), "é");
    }
}
