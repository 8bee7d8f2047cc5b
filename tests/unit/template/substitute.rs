use super::*;

fn params(pairs: &[(&str, &str)]) -> Parameters {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn escapes_markup_characters() {
    assert_eq!(xml_escape("a & b <c>"), "a &amp; b &lt;c&gt;");
    assert_eq!(xml_escape("Überwachung?"), "Überwachung?");
    assert_eq!(xml_escape(r#"say "hi""#), "say &quot;hi&quot;");
}

#[test]
fn quoted_values_stay_parseable_inside_attributes() {
    let out = substitute_placeholders(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><text aria-label="$title">$title</text></svg>"#,
        &params(&[("$title", r#"The "Cloud" & you"#)]),
    );
    let doc = crate::template::document::SvgDocument::parse(&out, std::path::Path::new("t.svg"))
        .unwrap();
    let text = doc.root().children.iter().find_map(|n| match n {
        crate::template::document::Node::Element(e) => Some(e),
        _ => None,
    });
    assert_eq!(
        text.and_then(|e| e.attribute("aria-label")),
        Some(r#"The "Cloud" & you"#)
    );
}

#[test]
fn replaces_all_occurrences() {
    let out = substitute_placeholders(
        "<text>$title</text><desc>$title</desc>",
        &params(&[("$title", "Tom & Jerry")]),
    );
    assert_eq!(out, "<text>Tom &amp; Jerry</text><desc>Tom &amp; Jerry</desc>");
}

#[test]
fn longer_tokens_win_over_their_prefixes() {
    let out = substitute_placeholders(
        "$title|$titlefull",
        &params(&[("$title", "short"), ("$titlefull", "long")]),
    );
    assert_eq!(out, "short|long");
}

#[test]
fn tokens_inside_markup_are_replaced_too() {
    // Documented sharp edge: substitution is not XML-aware.
    let out = substitute_placeholders(
        r#"<g id="$id"><text>$id</text></g>"#,
        &params(&[("$id", "5924")]),
    );
    assert_eq!(out, r#"<g id="5924"><text>5924</text></g>"#);
}

#[test]
fn missing_tokens_leave_template_untouched() {
    let tpl = "<svg><text>$subtitle</text></svg>";
    assert_eq!(substitute_placeholders(tpl, &Parameters::new()), tpl);
}
