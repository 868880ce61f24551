// Shared prompt fragments and prompt-building utilities.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Substitutes `{name}` placeholders in a single pass.
///
/// Inserted values are never scanned again, so a résumé that happens to
/// contain `{job_description}` stays verbatim. Braces that do not name a
/// known placeholder (JSON examples in the template) are kept as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = after.find('}').and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (end, *value))
        });
        match hit {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_named_placeholders() {
        let out = fill_template("A={a}, B={b}", &[("a", "1"), ("b", "2")]);
        assert_eq!(out, "A=1, B=2");
    }

    #[test]
    fn test_fill_template_keeps_json_braces() {
        let template = "Return {\n  \"score\": 0\n}\nTEXT: {text}";
        let out = fill_template(template, &[("text", "hello")]);
        assert_eq!(out, "Return {\n  \"score\": 0\n}\nTEXT: hello");
    }

    #[test]
    fn test_fill_template_does_not_rescan_inserted_values() {
        let out = fill_template(
            "R: {resume}\nJ: {jd}",
            &[("resume", "see {jd}"), ("jd", "Rust engineer")],
        );
        assert_eq!(out, "R: see {jd}\nJ: Rust engineer");
    }

    #[test]
    fn test_fill_template_unknown_placeholder_left_alone() {
        assert_eq!(fill_template("{unknown}", &[("a", "1")]), "{unknown}");
    }
}
