//! Template substitution for translation strings.
//!
//! Templates carry `{name}` placeholders. Substitution is a single left-to-right
//! scan: every placeholder with a matching param is replaced, unmatched ones are
//! kept literally, and substituted values are never scanned again.

use std::collections::HashMap;

/// Looks `key` up in `table` and fills its placeholders from `params`.
/// Unknown keys come back verbatim.
pub fn translate(table: &HashMap<String, String>, key: &str, params: &[(&str, &str)]) -> String {
    match table.get(key) {
        Some(template) => fill_placeholders(template, params),
        None => key.to_string(),
    }
}

pub fn fill_placeholders(template: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            // `{` inside the name means this brace opens nothing; the next one might.
            Some(close) if !after[..close].contains('{') => {
                let name = &after[..close];
                match params.iter().find(|(param, _)| *param == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[open..open + close + 2]),
                }
                rest = &after[close + 1..];
            }
            Some(_) => {
                out.push('{');
                rest = after;
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
