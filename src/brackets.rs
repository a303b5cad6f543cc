/// Locates the array literal that opens after the first `marker` in `text`.
///
/// The scan counts bracket depth, so arrays nested inside entries do not end
/// the match early. Brackets inside double-quoted strings are ignored.
/// Returns `None` when the marker or an opening bracket is missing, or when
/// the array never closes.
pub fn array_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let after_marker = text.find(marker)? + marker.len();
    let open = after_marker + text[after_marker..].find('[')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[open..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open..=open + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod test {
    use super::array_after;

    #[test]
    fn test_flat_array() {
        let text = r#"var all_rating = [{"rating":"1500"},{"rating":"1600"}]; var x = [1];"#;
        assert_eq!(
            array_after(text, "all_rating"),
            Some(r#"[{"rating":"1500"},{"rating":"1600"}]"#)
        );
    }

    #[test]
    fn test_nested_arrays_are_not_truncated() {
        let text = r#"all_rating = [{"code":"A","ranks":[1,[2,3]]},{"code":"B","ranks":[]}];"#;
        assert_eq!(
            array_after(text, "all_rating"),
            Some(r#"[{"code":"A","ranks":[1,[2,3]]},{"code":"B","ranks":[]}]"#)
        );
    }

    #[test]
    fn test_brackets_inside_strings() {
        let text = r#"all_rating = [{"name":"Cook-Off ]["},{"name":"say \"]\""}] trailing ]"#;
        assert_eq!(
            array_after(text, "all_rating"),
            Some(r#"[{"name":"Cook-Off ]["},{"name":"say \"]\""}]"#)
        );
    }

    #[test]
    fn test_starts_after_marker() {
        let text = "[0] all_rating = [1, 2]";
        assert_eq!(array_after(text, "all_rating"), Some("[1, 2]"));
    }

    #[test]
    fn test_unbalanced_or_missing() {
        assert_eq!(array_after("all_rating = [[1, 2]", "all_rating"), None);
        assert_eq!(array_after("all_rating = {}", "all_rating"), None);
        assert_eq!(array_after("nothing here [1]", "all_rating"), None);
    }
}
