use crate::options::DuplicateSearchOptions;

const PUNCTUATION: [char; 11] = ['.', ',', ';', ':', '!', '?', '\'', '"', '(', ')', '-'];

/// Produces the comparison key for a piece of text.
///
/// Case folding and the two stripping steps are controlled by the
/// `ignore_*` flags of `options`; whitespace is always collapsed and trimmed.
pub fn normalize(text: &str, options: &DuplicateSearchOptions) -> String {
    let mut result = if options.ignore_case {
        text.to_lowercase()
    } else {
        text.to_string()
    };
    if options.ignore_punctuation {
        result = result
            .chars()
            .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
            .collect();
    }
    if options.ignore_special_chars {
        result = result
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();
    }
    result.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn flags(ignore_case: bool, ignore_punctuation: bool, ignore_special_chars: bool) -> DuplicateSearchOptions {
        DuplicateSearchOptions {
            ignore_case,
            ignore_punctuation,
            ignore_special_chars,
            ..Default::default()
        }
    }

    #[test]
    fn strips_case_and_punctuation() {
        assert_eq!(normalize("Oil Change!!", &flags(true, true, false)), "oil change");
    }

    #[rstest]
    #[case("  Tire   Rotation ", "tire rotation")]
    #[case("A/C Recharge", "a c recharge")]
    #[case("Brake (Front) - Pads", "brake front pads")]
    #[case("Café Wash & Wax", "caf wash wax")]
    #[case("", "")]
    fn default_flags(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input, &DuplicateSearchOptions::default()), expected);
    }

    #[test]
    fn flags_off_only_collapses_whitespace() {
        assert_eq!(normalize("  Oil\tChange!! ", &flags(false, false, false)), "Oil Change!!");
    }

    #[test]
    fn special_chars_without_punctuation_flag() {
        // Punctuation is outside [a-zA-Z0-9\s] so it goes too.
        assert_eq!(normalize("Wash & Wax!", &flags(false, false, true)), "Wash Wax");
    }

    #[test]
    fn punctuation_without_special_chars_keeps_symbols() {
        assert_eq!(normalize("Wash & Wax!", &flags(true, true, false)), "wash & wax");
    }
}
