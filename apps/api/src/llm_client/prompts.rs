// Shared prompt fragments. Each service that calls the model keeps its own
// prompts.rs next to it; this file holds the cross-cutting pieces.

/// System prompt fragment asking for a single JSON object.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant for a \
    workforce planning tool. You MUST answer with a single JSON object. \
    You may wrap it in a ```json code fence. \
    Do NOT include explanations or apologies outside the JSON.";

/// Reminder that ids must be echoed back exactly.
pub const ID_FIDELITY_INSTRUCTION: &str = "\
    Refer to employees ONLY by the exact `id` values provided. \
    Never invent ids, names, or skills that are not in the input.";

/// Substitutes `{name}` placeholders in one pass. Inserted values are never
/// rescanned, so user text that looks like a placeholder stays literal.
/// Braces that do not open a known placeholder are copied as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = values.iter().find(|(name, _)| {
            tail[1..].starts_with(name) && tail[1 + name.len()..].starts_with('}')
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
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
    fn test_fill_template_substitutes_known_placeholders() {
        let filled = fill_template("{a} and {b}; {\"json\": {c}}", &[("a", "1"), ("b", "2")]);
        assert_eq!(filled, "1 and 2; {\"json\": {c}}");
    }

    #[test]
    fn test_fill_template_does_not_expand_inserted_text() {
        let filled = fill_template(
            "Title: {title}\n{candidates}",
            &[("title", "{candidates}"), ("candidates", "Ada")],
        );
        assert_eq!(filled, "Title: {candidates}\nAda");
    }
}
