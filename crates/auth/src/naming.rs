//! Local display-name rules.

use crate::SsoAssertion;

/// Strip everything except ASCII letters and digits.
pub fn sanitize(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// `<first>_<last>_<external uid>` with both name parts sanitized.
///
/// The uid suffix keeps the name unique even when two people share a name.
pub fn unique_display_name(assertion: &SsoAssertion) -> String {
    format!(
        "{}_{}_{}",
        sanitize(assertion.first_name()),
        sanitize(assertion.last_name()),
        assertion.external_uid()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(sanitize("Jo-hn"), "John");
        assert_eq!(sanitize("D'oe"), "Doe");
        assert_eq!(sanitize("Mary Ann 2"), "MaryAnn2");
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        assert_eq!(sanitize("Zoë"), "Zo");
        assert_eq!(sanitize("Łukasz"), "ukasz");
    }

    #[test]
    fn display_name_combines_names_and_uid() {
        let a = SsoAssertion::new("u9", "a@x.com", "Jo-hn", "D'oe", "Admin").unwrap();
        assert_eq!(unique_display_name(&a), "John_Doe_u9");
    }

    #[test]
    fn empty_names_still_produce_uid_suffix() {
        let a = SsoAssertion::new("usr-7", "a@x.com", "", "!!", "Member").unwrap();
        assert_eq!(unique_display_name(&a), "__usr-7");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: output is alphanumeric and sanitizing twice changes nothing.
        #[test]
        fn sanitize_is_idempotent(input in ".{0,64}") {
            let once = sanitize(&input);
            prop_assert!(once.chars().all(|c| c.is_ascii_alphanumeric()));
            prop_assert_eq!(sanitize(&once), once);
        }
    }
}
