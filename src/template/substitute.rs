use crate::animation::sequence::Parameters;

/// Escape `&`, `<`, `>` and `"` for use in XML text or double-quoted attribute values.
pub fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace every literal occurrence of each placeholder token with its XML-escaped value.
///
/// This is a raw text pass over the whole template, run before parsing: a token that also occurs
/// inside unrelated markup is replaced there too. Tokens are applied longest first so that a
/// token which is a prefix of another (`$title`, `$titlefull`) cannot clobber it.
pub fn substitute_placeholders(template: &str, params: &Parameters) -> String {
    let mut tokens: Vec<(&String, &String)> =
        params.iter().filter(|(token, _)| !token.is_empty()).collect();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    let mut out = template.to_string();
    for (token, value) in tokens {
        out = out.replace(token.as_str(), &xml_escape(value));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/template/substitute.rs"]
mod tests;
