//! Document type declaration handling
//!
//! The XML parser only accepts a `<!DOCTYPE>` that follows an XML declaration
//! and has no internal subset. The declaration is removed before parsing;
//! internal general entities declared with a literal value are expanded into
//! the document body. External DTDs and external or parameter entities are
//! never loaded, so references to them still fail to parse.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Upper bound on text produced by entity expansion
const MAX_EXPANSION: usize = 1 << 20;

lazy_static! {
    static ref ENTITY_DECL: Regex =
        Regex::new(r#"<!ENTITY\s+([A-Za-z_:][\w.:\-]*)\s+(?:"([^"]*)"|'([^']*)')\s*>"#)
            .expect("entity declaration regex is valid");

    /// Regions that are left verbatim, or a general entity reference
    static ref REFERENCE_OR_VERBATIM: Regex =
        Regex::new(r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|<\?.*?\?>|&([A-Za-z_:][\w.:\-]*);")
            .expect("entity reference regex is valid");
}

/// Remove the document type declaration, expanding its internal entities
pub fn resolve(xml: &str) -> Result<Cow<'_, str>, String> {
    let Some(span) = doctype_span(xml) else {
        return Ok(Cow::Borrowed(xml));
    };

    let declaration = &xml[span.clone()];
    let body = xml[span.end..].trim_start();
    let entities = internal_entities(declaration)?;
    tracing::trace!(
        "Removed document type declaration with {} internal entit(ies)",
        entities.len()
    );

    let mut resolved = String::with_capacity(xml.len());
    resolved.push_str(&xml[..span.start]);
    if entities.is_empty() {
        resolved.push_str(body);
    } else {
        resolved.push_str(&expand(body, &entities));
    }

    if resolved.len() > xml.len() + MAX_EXPANSION {
        return Err("entity expansion exceeds limit".to_string());
    }
    Ok(Cow::Owned(resolved))
}

/// Byte range of a `<!DOCTYPE ...>` in the prolog, if there is one
fn doctype_span(xml: &str) -> Option<Range<usize>> {
    let mut pos = 0;
    loop {
        let rest = &xml[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        if trimmed.starts_with("<!DOCTYPE") {
            return Some(pos..pos + declaration_len(trimmed)?);
        } else if trimmed.starts_with("<!--") {
            pos += trimmed.find("-->")? + 3;
        } else if trimmed.starts_with("<?") {
            pos += trimmed.find("?>")? + 2;
        } else {
            return None;
        }
    }
}

/// Length of the declaration at the start of `text`, through its closing `>`
fn declaration_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote = None;
    let mut in_subset = false;
    let mut i = "<!DOCTYPE".len();

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'<' if in_subset && bytes[i..].starts_with(b"<!--") => {
                    i += text[i..].find("-->")? + 3;
                    continue;
                }
                b'"' | b'\'' => quote = Some(b),
                b'[' => in_subset = true,
                b']' => in_subset = false,
                b'>' if !in_subset => return Some(i + 1),
                _ => {}
            },
        }
        i += 1;
    }

    None
}

/// Internal general entities, each expanded against those declared before it
fn internal_entities(declaration: &str) -> Result<HashMap<String, String>, String> {
    let mut entities = HashMap::new();
    for caps in ENTITY_DECL.captures_iter(declaration) {
        let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        let value = expand(value, &entities);
        if value.len() > MAX_EXPANSION {
            return Err(format!("entity '{}' expands beyond limit", &caps[1]));
        }
        // The first declaration of a name is binding
        entities.entry(caps[1].to_string()).or_insert(value);
    }
    Ok(entities)
}

fn expand(text: &str, entities: &HashMap<String, String>) -> String {
    REFERENCE_OR_VERBATIM
        .replace_all(text, |caps: &Captures| {
            caps.get(1)
                .and_then(|name| entities.get(name.as_str()))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_doctype_is_borrowed() {
        let xml = "<?xml version=\"1.0\"?><!-- note --><Test/>";
        assert!(matches!(resolve(xml).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_external_id_is_removed() {
        let resolved = resolve(r#"<!DOCTYPE Test SYSTEM "test.dtd"><Test/>"#).unwrap();
        assert_eq!(resolved, "<Test/>");

        let resolved = resolve("<?xml version=\"1.0\"?>\n<!-- c -->\n<!DOCTYPE Test PUBLIC \"-//X//a>b\" \"t.dtd\">\n<Test/>").unwrap();
        assert_eq!(resolved, "<?xml version=\"1.0\"?>\n<!-- c -->\n<Test/>");
    }

    #[test]
    fn test_internal_subset_is_removed() {
        let xml = r#"<!DOCTYPE Test [
            <!-- a comment with ] and > and ' -->
            <!ELEMENT Test (#PCDATA)>
            <!ATTLIST Test kind CDATA "a]b>">
        ]><Test/>"#;
        assert_eq!(resolve(xml).unwrap(), "<Test/>");
    }

    #[test]
    fn test_internal_entities_are_expanded() {
        let xml = r#"<!DOCTYPE Test [<!ENTITY e "x"><!ENTITY both '&e;&e;'>]><Test a="&e;">&both;&amp;&unknown;<![CDATA[&e;]]><!-- &e; --></Test>"#;
        assert_eq!(
            resolve(xml).unwrap(),
            r#"<Test a="x">xx&amp;&unknown;<![CDATA[&e;]]><!-- &e; --></Test>"#
        );
    }

    #[test]
    fn test_doctype_after_root_is_not_touched() {
        let xml = "<Test><![CDATA[<!DOCTYPE x>]]></Test>";
        assert!(matches!(resolve(xml).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_exponential_expansion_is_rejected() {
        let mut xml = String::from("<!DOCTYPE a [<!ENTITY l0 \"lollollollollollollollollollol\">");
        for level in 1..10 {
            let previous = format!("&l{};", level - 1).repeat(10);
            xml.push_str(&format!("<!ENTITY l{level} \"{previous}\">"));
        }
        xml.push_str("]><a>&l9;</a>");

        assert!(resolve(&xml).is_err());
    }
}
