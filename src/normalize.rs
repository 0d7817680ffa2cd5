//! Turns raw codes into the token form the action lines embed.
//!
//! Per code: trim, drop every `?`, drop every space, drop every `-`, trim
//! whatever whitespace that uncovered, and discard the code if nothing is
//! left. `*` and every other character pass through untouched. The rules
//! are idempotent.

/// Cleans a single code, returning `None` when nothing survives.
pub fn clean_code(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '?' | ' ' | '-'))
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Cleans every code, preserving order and dropping empty results.
pub fn clean_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .filter_map(|code| clean_code(code.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_question_marks_spaces_and_hyphens() {
        assert_eq!(clean_code("27-84?0001402").as_deref(), Some("27840001402"));
        assert_eq!(clean_code("  12 34-5? ").as_deref(), Some("12345"));
        assert_eq!(clean_code("12\t-").as_deref(), Some("12"));
        assert_eq!(clean_code("-\t5").as_deref(), Some("5"));
    }

    #[test]
    fn keeps_stars_and_other_punctuation() {
        assert_eq!(clean_code("*12-3*").as_deref(), Some("*123*"));
        assert_eq!(clean_code("a.b_c/1").as_deref(), Some("a.b_c/1"));
    }

    #[test]
    fn drops_codes_that_clean_to_nothing() {
        assert_eq!(clean_codes(["?", " - ", "", "7"]), vec!["7"]);
        assert_eq!(clean_codes(["-\t-"]), Vec::<String>::new());
    }

    #[test]
    fn cleaning_is_idempotent_and_never_leaves_stripped_chars() {
        let inputs = [
            "27-84?0001402",
            " ?-? ",
            "*1 2*",
            "x\t-y",
            "--5--",
            "é-?ß",
            "12\t-",
            "-\t5",
            "?\t-\t?",
        ];
        let once = clean_codes(inputs);
        assert_eq!(clean_codes(&once), once);
        for code in &once {
            assert!(!code.is_empty());
            assert!(!code.contains(['?', '-', ' ']), "{code:?}");
        }
    }
}
