use crate::document::{Document, RenderedFragment, OMITTED_NOTICE, SECTION_TRUNCATED_NOTICE};
use anyhow::Result;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Characters outside the XML 1.0 `Char` production become U+FFFD.
fn xml_chars(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => c,
            c if c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}' => '\u{FFFD}',
            c => c,
        })
        .collect()
}

/// A literal `]]>` would end the CDATA section early; split it across two sections.
fn cdata_safe(input: &str) -> String {
    xml_chars(input).replace("]]>", "]]]]><![CDATA[>")
}

fn write_notice<W: std::io::Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("notice")))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("notice")))?;
    Ok(())
}

fn write_fragment<W: std::io::Write>(writer: &mut Writer<W>, f: &RenderedFragment) -> Result<()> {
    let mut el = BytesStart::new("fragment");
    let path = f.heading.as_deref().map(xml_chars);
    if let Some(path) = &path {
        el.push_attribute(("path", path.as_str()));
    }
    if let Some(lang) = f.language.as_deref().filter(|l| !l.is_empty()) {
        el.push_attribute(("lang", lang));
    }
    el.push_attribute(("kind", f.kind.label()));
    writer.write_event(Event::Start(el))?;

    let body = cdata_safe(&f.text);
    writer.write_event(Event::CData(BytesCData::new(body.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new("fragment")))?;
    Ok(())
}

/// Same document as the markdown renderer, as XML.
pub fn build_context_xml(doc: &Document) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let h = &doc.header;
    let repo_path = h.repo_path.display().to_string();
    let types = h.project_types.join(",");
    let mut root = BytesStart::new("repository_context");
    root.push_attribute(("generator", h.generator.as_str()));
    root.push_attribute(("generated_at", h.generated_at.as_str()));
    root.push_attribute(("repository", h.repo_name.as_str()));
    root.push_attribute(("path", repo_path.as_str()));
    root.push_attribute(("project_types", types.as_str()));
    writer.write_event(Event::Start(root))?;

    for section in &doc.sections {
        let mut el = BytesStart::new("section");
        el.push_attribute(("name", section.category.slug()));
        el.push_attribute(("title", section.category.title()));
        writer.write_event(Event::Start(el))?;

        for fragment in &section.fragments {
            write_fragment(&mut writer, fragment)?;
        }
        if section.truncated {
            write_notice(&mut writer, SECTION_TRUNCATED_NOTICE)?;
        }
        writer.write_event(Event::End(BytesEnd::new("section")))?;
    }

    if doc.omitted {
        write_notice(&mut writer, OMITTED_NOTICE)?;
    }

    let emitted = doc.emitted_size.to_string();
    let mut footer = BytesStart::new("footer");
    footer.push_attribute(("emitted_size", emitted.as_str()));
    writer.write_event(Event::Empty(footer))?;

    writer.write_event(Event::End(BytesEnd::new("repository_context")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}
