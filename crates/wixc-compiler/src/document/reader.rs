//! XML text to [`Document`], via quick-xml's namespace-aware reader.

use std::io::Cursor;

use quick_xml::NsReader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use rowan::{TextRange, TextSize};

use super::{Attribute, Document, NodeId, QName};
use crate::{Error, Result};

/// Parse XML text into a [`Document`].
///
/// Positions are byte offsets into `source`. Namespace declarations are
/// consumed by the reader and do not appear as attributes.
pub fn parse(source: &str) -> Result<Document> {
    // Text is kept untrimmed so entity references keep their surrounding
    // spaces; `Element::text` trims the joined result.
    let mut reader = NsReader::from_reader(Cursor::new(source.as_bytes()));

    let mut doc = Document {
        nodes: Vec::new(),
        source: Some(source.to_owned()),
    };
    let mut stack: Vec<NodeId> = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let position = reader.buffer_position();
        let (resolve, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| xml_error(position, e))?;
        let namespace = resolve_namespace(resolve);
        let end = reader.buffer_position();

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                // `<` + name + `>`, and a `/` more for empty tags
                let tag_len = e.len() as u64 + if is_empty { 3 } else { 2 };
                let start = end.saturating_sub(tag_len);

                if stack.is_empty() && !doc.nodes.is_empty() {
                    return Err(Error::Xml {
                        offset: start,
                        message: "more than one document element".to_string(),
                    });
                }

                let local = utf8(e.local_name().as_ref(), start)?;
                let id = doc.push(
                    stack.last().copied(),
                    QName {
                        namespace,
                        local,
                    },
                    range(start, end),
                );
                read_attributes(&reader, e, start, &mut doc, id)?;

                if !is_empty {
                    stack.push(id);
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(e) => {
                let text = e.decode().map_err(|err| xml_error(end, err))?;
                if let Some(&top) = stack.last() {
                    doc.push_text(top, &text);
                }
            }
            Event::CData(e) => {
                let text = utf8(&e, end)?;
                if let Some(&top) = stack.last() {
                    doc.push_text(top, &text);
                }
            }
            Event::GeneralRef(e) => {
                let raw = e.decode().map_err(|err| xml_error(end, err))?;
                let resolved = resolve_entity(&raw, end)?;
                if let Some(&top) = stack.last() {
                    doc.push_text(top, &resolved);
                }
            }
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(Error::Xml {
            offset: source.len() as u64,
            message: "unexpected end of input inside an element".to_string(),
        });
    }
    if doc.nodes.is_empty() {
        return Err(Error::Xml {
            offset: 0,
            message: "no document element".to_string(),
        });
    }

    tracing::trace!(elements = doc.nodes.len(), "parsed document");
    Ok(doc)
}

fn read_attributes(
    reader: &NsReader<Cursor<&[u8]>>,
    e: &BytesStart<'_>,
    tag_start: u64,
    doc: &mut Document,
    id: NodeId,
) -> Result<()> {
    let raw: &[u8] = e;
    let mut cursor = e.name().as_ref().len();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(tag_start, err))?;

        let key = attr.key;
        if key.as_ref() == b"xmlns" {
            continue;
        }
        if let Some(prefix) = key.prefix()
            && prefix.as_ref() == b"xmlns"
        {
            continue;
        }

        let (attr_resolve, _) = reader.resolver().resolve_attribute(key);
        let namespace = resolve_namespace(attr_resolve);
        let local = utf8(key.local_name().as_ref(), tag_start)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|err| xml_error(tag_start, err))?
            .into_owned();

        // Attributes come back in source order, so the search only moves forward.
        let key_bytes = key.as_ref();
        let offset = find(raw, key_bytes, cursor).unwrap_or(cursor);
        cursor = offset + key_bytes.len();
        let start = tag_start + 1 + offset as u64;

        doc.push_attribute(
            id,
            Attribute {
                name: QName { namespace, local },
                value,
                range: range(start, start + key_bytes.len() as u64),
            },
        );
    }
    Ok(())
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

fn resolve_namespace(resolve: ResolveResult<'_>) -> Option<String> {
    match resolve {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn resolve_entity(raw: &str, offset: u64) -> Result<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.into());
    }

    if let Some(rest) = raw.strip_prefix('#') {
        let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => rest.parse::<u32>().ok(),
        };
        return code
            .and_then(char::from_u32)
            .map(|ch| ch.to_string())
            .ok_or_else(|| Error::Xml {
                offset,
                message: format!("invalid character reference `&{raw};`"),
            });
    }

    Err(Error::Xml {
        offset,
        message: format!("unknown entity `&{raw};`"),
    })
}

fn utf8(bytes: &[u8], offset: u64) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| xml_error(offset, err))
}

fn xml_error(offset: u64, err: impl std::fmt::Display) -> Error {
    Error::Xml {
        offset,
        message: err.to_string(),
    }
}

fn range(start: u64, end: u64) -> TextRange {
    let start = TextSize::from(start as u32);
    let end = TextSize::from(end as u32);
    TextRange::new(start, end.max(start))
}
