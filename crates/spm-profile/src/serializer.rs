//! Canonical XML rendering of field records.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use spm_schema::METADATA_NAMESPACE;
use spm_types::ApiVersion;
use tracing::warn;

use crate::error::{ProfileError, ProfileResult};
use crate::record::FieldRecord;
use crate::scanner::PROFILE_ROOT;

const INDENT: usize = 4;

/// Render records as a canonical profile document.
///
/// Records are written in ascending identity order. Disabled records and
/// records whose category does not exist at `version` are left out, as are
/// null or empty attribute values. The output ends with a newline.
pub fn render_profile<'a>(
    records: impl IntoIterator<Item = &'a FieldRecord>,
    version: ApiVersion,
) -> ProfileResult<String> {
    let mut sorted: Vec<&FieldRecord> = records.into_iter().filter(|r| !r.is_disabled()).collect();
    sorted.sort_by(|a, b| a.identity().cmp(b.identity()));

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new(PROFILE_ROOT);
    root.push_attribute(("xmlns", METADATA_NAMESPACE));
    write(&mut writer, Event::Start(root))?;

    for record in sorted {
        if !record.category().is_active(version) {
            warn!(identity = record.identity(), %version, "dropping record outside version window");
            continue;
        }
        if record.is_scalar() {
            if let Some(text) = record.value().and_then(|v| v.render()) {
                write_text_element(&mut writer, record.category_name(), &text)?;
            }
            continue;
        }

        let children: Vec<(String, String)> = record
            .attributes()
            .into_iter()
            .filter_map(|(name, value)| value.render().map(|text| (name, text)))
            .collect();
        let tag = record.category_name();
        if children.is_empty() {
            write(&mut writer, Event::Empty(BytesStart::new(tag)))?;
            continue;
        }
        write(&mut writer, Event::Start(BytesStart::new(tag)))?;
        for (name, text) in &children {
            write_text_element(&mut writer, name, text)?;
        }
        write(&mut writer, Event::End(BytesEnd::new(tag)))?;
    }

    write(&mut writer, Event::End(BytesEnd::new(PROFILE_ROOT)))?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|e| ProfileError::Serialize(format!("output is not UTF-8: {e}")))?;
    xml.push('\n');
    Ok(xml)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> ProfileResult<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> ProfileResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ProfileError::Serialize(e.to_string()))
}
