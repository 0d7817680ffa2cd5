//! Renders cleaned codes into action lines understood by the routing system.

/// Removes the quote characters that would break the line syntax.
pub fn sanitize_destination(destination: &str) -> String {
    destination.replace(['"', '\''], "")
}

/// `{ "?.?.<code>" }  : Actions SET_DEST_LA("<destination>"),SET_ESME_GROUP(SAG_GROUP_1, A_ADDR)`
///
/// `destination` is embedded as given; call [`sanitize_destination`] first or
/// use [`format_action_lines`].
pub fn format_action_line(code: &str, destination: &str) -> String {
    format!(
        "{{ \"?.?.{code}\" }}  : Actions SET_DEST_LA(\"{destination}\"),SET_ESME_GROUP(SAG_GROUP_1, A_ADDR)"
    )
}

/// One action line per code, same order.
pub fn format_action_lines<S: AsRef<str>>(codes: &[S], destination: &str) -> Vec<String> {
    let destination = sanitize_destination(destination);
    codes
        .iter()
        .map(|code| format_action_line(code.as_ref(), &destination))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_exact_line_syntax() {
        assert_eq!(
            format_action_lines(&["27840001402"], "cellfsc"),
            vec![
                r#"{ "?.?.27840001402" }  : Actions SET_DEST_LA("cellfsc"),SET_ESME_GROUP(SAG_GROUP_1, A_ADDR)"#
            ]
        );
    }

    #[test]
    fn strips_quotes_from_destination() {
        let lines = format_action_lines(&["1"], r#"o'ne"two"#);
        assert!(lines[0].contains(r#"SET_DEST_LA("onetwo")"#));
    }

    #[test]
    fn one_line_per_code_in_order() {
        let codes = ["3", "1", "*2"];
        let lines = format_action_lines(&codes, "dest");
        assert_eq!(lines.len(), codes.len());
        for (line, code) in lines.iter().zip(codes) {
            assert!(line.starts_with(&format!("{{ \"?.?.{code}\" }}")));
        }
        assert!(format_action_lines::<String>(&[], "dest").is_empty());
    }
}
