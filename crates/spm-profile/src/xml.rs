//! Minimal element tree over `quick-xml` events.
//!
//! Profiles are small and only two levels deep, so the scanner works on a
//! fully built tree rather than on the event stream.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ProfileError, ProfileResult};

/// A parsed element with its namespace prefix stripped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Local tag name.
    pub name: String,
    /// Namespace URI in scope for this element, if any.
    pub namespace: Option<String>,
    /// Concatenated text content, `None` when the element has no text.
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn open(start: &BytesStart<'_>, inherited: Option<&str>) -> ProfileResult<Self> {
        let name = utf8(start.local_name().as_ref())?.to_string();
        let prefix = start
            .name()
            .prefix()
            .map(|p| utf8(p.as_ref()).map(str::to_string))
            .transpose()?;
        let ns_key = match &prefix {
            Some(p) => format!("xmlns:{p}"),
            None => "xmlns".to_string(),
        };

        let mut namespace = inherited.map(str::to_string);
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ProfileError::Parse(format!("bad attribute on <{name}>: {e}")))?;
            if attr.key.as_ref() == ns_key.as_bytes() {
                let value = attr
                    .unescape_value()
                    .map_err(|e| ProfileError::Parse(format!("bad namespace on <{name}>: {e}")))?;
                namespace = Some(value.into_owned());
            }
        }

        Ok(Self {
            name,
            namespace,
            text: None,
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Text of the element, `None` if absent.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

fn utf8(bytes: &[u8]) -> ProfileResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| ProfileError::Parse(format!("invalid UTF-8 in name: {e}")))
}

/// Parse a complete document and return its root element.
///
/// Fails on any well-formedness problem: mismatched or unclosed tags, text
/// or a second element outside the root, or a document with no root at all.
pub fn parse_document(input: &str) -> ProfileResult<XmlElement> {
    let mut reader = Reader::from_str(input);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ProfileError::Parse(format!("at byte {}: {e}", reader.buffer_position())))?;
        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(ProfileError::Parse("multiple root elements".into()));
                }
                let inherited = stack.last().and_then(|p| p.namespace.as_deref());
                let element = XmlElement::open(&start, inherited)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let inherited = stack.last().and_then(|p| p.namespace.as_deref());
                let element = XmlElement::open(&start, inherited)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ProfileError::Parse("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| ProfileError::Parse(format!("bad text content: {e}")))?;
                // Whitespace-only runs are indentation; other text is kept verbatim.
                if text.trim().is_empty() {
                    continue;
                }
                match stack.last_mut() {
                    Some(top) => top.push_text(&text),
                    None => return Err(ProfileError::Parse("text outside the root element".into())),
                }
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| ProfileError::Parse(format!("invalid UTF-8 in CDATA: {e}")))?;
                match stack.last_mut() {
                    Some(top) => top.push_text(text),
                    None => return Err(ProfileError::Parse("CDATA outside the root element".into())),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ProfileError::Parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| ProfileError::Parse("document has no root element".into()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> ProfileResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ProfileError::Parse("multiple root elements".into())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://soap.sforce.com/2006/04/metadata";

    #[test]
    fn parses_nested_elements_with_namespace() {
        let doc = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Profile xmlns="{NS}">
    <classAccesses>
        <apexClass>Foo</apexClass>
        <enabled>true</enabled>
    </classAccesses>
    <custom>false</custom>
</Profile>"#
        );
        let root = parse_document(&doc).unwrap();
        assert_eq!(root.name, "Profile");
        assert_eq!(root.namespace.as_deref(), Some(NS));
        assert_eq!(root.children.len(), 2);

        let access = &root.children[0];
        assert_eq!(access.name, "classAccesses");
        assert_eq!(access.namespace.as_deref(), Some(NS));
        assert_eq!(access.children[0].text(), Some("Foo"));
        assert_eq!(access.children[1].text(), Some("true"));
        assert_eq!(root.children[1].text(), Some("false"));
    }

    #[test]
    fn strips_prefixes() {
        let doc = format!(r#"<sf:Profile xmlns:sf="{NS}"><sf:fullName>Admin</sf:fullName></sf:Profile>"#);
        let root = parse_document(&doc).unwrap();
        assert_eq!(root.name, "Profile");
        assert_eq!(root.children[0].name, "fullName");
        assert_eq!(root.children[0].namespace.as_deref(), Some(NS));
    }

    #[test]
    fn unescapes_entities() {
        let root = parse_document("<Profile><description>R&amp;D &lt;team&gt;</description></Profile>").unwrap();
        assert_eq!(root.children[0].text(), Some("R&D <team>"));
    }

    #[test]
    fn text_content_keeps_surrounding_whitespace() {
        let root = parse_document(
            "<Profile>\n    <description>  a &amp; b  </description>\n    <fullName>Admin</fullName>\n</Profile>",
        )
        .unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].text(), Some("  a & b  "));
        assert_eq!(root.text(), None);
    }

    #[test]
    fn empty_elements_have_no_text() {
        let root = parse_document("<Profile><description/><fullName></fullName></Profile>").unwrap();
        assert_eq!(root.children[0].text(), None);
        assert_eq!(root.children[1].text(), None);
    }

    #[test]
    fn cdata_is_text() {
        let root = parse_document("<Profile><description><![CDATA[a < b]]></description></Profile>").unwrap();
        assert_eq!(root.children[0].text(), Some("a < b"));
    }

    #[test]
    fn rejects_mismatched_tags() {
        assert!(matches!(
            parse_document("<Profile><custom>true</fullName></Profile>"),
            Err(ProfileError::Parse(_))
        ));
    }

    #[test]
    fn rejects_unclosed_root() {
        assert!(matches!(
            parse_document("<Profile><custom>true</custom>"),
            Err(ProfileError::Parse(_))
        ));
    }

    #[test]
    fn rejects_empty_document() {
        assert!(matches!(parse_document(""), Err(ProfileError::Parse(_))));
        assert!(matches!(
            parse_document(r#"<?xml version="1.0"?>"#),
            Err(ProfileError::Parse(_))
        ));
    }

    #[test]
    fn rejects_multiple_roots() {
        assert!(matches!(
            parse_document("<Profile/><Profile/>"),
            Err(ProfileError::Parse(_))
        ));
    }

    #[test]
    fn rejects_stray_text() {
        assert!(matches!(
            parse_document("hello <Profile/>"),
            Err(ProfileError::Parse(_))
        ));
    }
}
