use std::fmt;

/// Ordered list of declarations from an inline `style` attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    decls: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse `"fill:#fff; opacity: 0.5"`. Declarations without a `:` are dropped.
    ///
    /// Only top-level `;` separate declarations; quoted strings and parenthesized values such as
    /// `url(...)` are kept whole.
    pub fn parse(text: &str) -> Self {
        let decls = split_declarations(text)
            .into_iter()
            .filter_map(|decl| {
                let (key, value) = decl.split_once(':')?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { decls }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`, keeping the position of an existing declaration.
    pub fn set(&mut self, key: &str, value: &str) {
        match self
            .decls
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some(decl) => decl.1 = value.to_string(),
            None => self.decls.push((key.to_string(), value.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

fn split_declarations(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut quote = None;
    let mut depth = 0usize;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&text[start..]);
    out
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.decls.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/style.rs"]
mod tests;
