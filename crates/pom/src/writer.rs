use std::io::Cursor;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use vman_core::{Descriptor, VmanError};

use crate::model_path::{Entry, Field, entry_at, field_at};
use crate::reader::parse_model;

fn write_error(descriptor: &Descriptor, reason: impl ToString) -> VmanError {
    VmanError::Write {
        target: descriptor.path().to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Position of each `<dependency>` element inside the descriptor's
/// declaration list. Entries the reader skipped as incomplete map to `None`.
fn declaration_slots(descriptor: &Descriptor, managed: bool) -> Result<Vec<Option<usize>>, VmanError> {
    let model = parse_model(descriptor.path(), descriptor.source())
        .map_err(|e| write_error(descriptor, e))?;
    let mut next = 0;
    Ok(model
        .entries
        .iter()
        .filter(|(entry, _)| *entry == Entry::Dependency { managed })
        .map(|(_, fields)| {
            (fields.group.is_some() && fields.artifact.is_some()).then(|| {
                next += 1;
                next - 1
            })
        })
        .collect())
}

/// Render `descriptor` back onto the text it was read from.
///
/// Every event of the source is written back unchanged except the text of
/// `<version>` elements whose in-memory version differs; surrounding
/// whitespace and comments inside the element are kept. Plugin versions are
/// never touched.
pub fn write_pom(descriptor: &Descriptor) -> Result<String, VmanError> {
    let source = descriptor.source();
    let unmanaged_slots = declaration_slots(descriptor, false)?;
    let managed_slots = declaration_slots(descriptor, true)?;

    let mut reader = Reader::from_str(source);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut unmanaged_seen = 0;
    let mut managed_seen = 0;
    let mut slot: Option<(bool, Option<usize>)> = None;
    // events of the version element currently open
    let mut pending: Option<Vec<Piece>> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| write_error(descriptor, format!("XML parsing error: {e}")))?;

        match event {
            Event::Start(e) => {
                if let Some(pieces) = pending.take() {
                    write_pieces(&mut writer, pieces).map_err(|e| write_error(descriptor, e))?;
                }
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                if let Some(Entry::Dependency { managed }) = entry_at(&stack) {
                    let (slots, seen) = if managed {
                        (&managed_slots, &mut managed_seen)
                    } else {
                        (&unmanaged_slots, &mut unmanaged_seen)
                    };
                    slot = Some((managed, slots.get(*seen).copied().flatten()));
                    *seen += 1;
                }
                if field_at(&stack).is_some_and(|field| field.is_version()) {
                    pending = Some(Vec::new());
                }
                writer
                    .write_event(Event::Start(e.clone()))
                    .map_err(|e| write_error(descriptor, e))?;
            }
            Event::Text(e) if pending.is_some() => {
                if let Some(pieces) = pending.as_mut() {
                    push_text(pieces, &String::from_utf8_lossy(&e));
                }
            }
            Event::GeneralRef(e) if pending.is_some() => {
                if let Some(pieces) = pending.as_mut() {
                    push_text(pieces, &format!("&{};", String::from_utf8_lossy(&e)));
                }
            }
            Event::End(e) => {
                if let Some(pieces) = pending.take() {
                    let desired =
                        field_at(&stack).and_then(|field| version_for(descriptor, field, slot));
                    let pieces = match desired {
                        Some(version) if version != current_text(&pieces).trim() => {
                            replace_text(pieces, version).ok_or_else(|| {
                                write_error(descriptor, "Version element has no text to replace")
                            })?
                        }
                        _ => pieces,
                    };
                    write_pieces(&mut writer, pieces).map_err(|e| write_error(descriptor, e))?;
                }
                if matches!(entry_at(&stack), Some(Entry::Dependency { .. })) {
                    slot = None;
                }
                stack.pop();
                writer
                    .write_event(Event::End(e.clone()))
                    .map_err(|e| write_error(descriptor, e))?;
            }
            Event::Eof => break,
            other => match pending.as_mut() {
                Some(pieces) => pieces.push(Piece::Other(other.into_owned())),
                None => writer
                    .write_event(other)
                    .map_err(|e| write_error(descriptor, e))?,
            },
        }
        buf.clear();
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| write_error(descriptor, format!("Failed to convert XML to UTF-8: {e}")))
}

/// Content of an open `<version>` element: escaped text runs and the
/// comments or instructions between them.
enum Piece {
    Text(String),
    Other(Event<'static>),
}

fn push_text(pieces: &mut Vec<Piece>, raw: &str) {
    match pieces.last_mut() {
        Some(Piece::Text(text)) => text.push_str(raw),
        _ => pieces.push(Piece::Text(raw.to_string())),
    }
}

/// Unescaped text of the element, as the reader saw it.
fn current_text(pieces: &[Piece]) -> String {
    pieces
        .iter()
        .filter_map(|piece| match piece {
            Piece::Text(raw) => Some(unescape(raw).map_or_else(|_| raw.clone(), |text| text.into_owned())),
            Piece::Other(_) => None,
        })
        .collect()
}

/// Puts `version` in place of the first non-blank text run and drops the
/// other non-blank runs. `None` if there is no text to replace.
fn replace_text(pieces: Vec<Piece>, version: &str) -> Option<Vec<Piece>> {
    let mut replaced = false;
    let pieces: Vec<Piece> = pieces
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Text(raw) if raw.trim().is_empty() => Some(Piece::Text(raw)),
            Piece::Text(_) if replaced => None,
            Piece::Text(raw) => {
                replaced = true;
                let leading = &raw[..raw.len() - raw.trim_start().len()];
                let trailing = &raw[raw.trim_end().len()..];
                Some(Piece::Text(format!("{leading}{}{trailing}", escape(version))))
            }
            other => Some(other),
        })
        .collect();
    replaced.then_some(pieces)
}

fn write_pieces(writer: &mut Writer<Cursor<Vec<u8>>>, pieces: Vec<Piece>) -> std::io::Result<()> {
    for piece in pieces {
        match piece {
            Piece::Text(raw) if raw.is_empty() => {}
            Piece::Text(raw) => writer.write_event(Event::Text(BytesText::from_escaped(raw)))?,
            Piece::Other(event) => writer.write_event(event)?,
        }
    }
    Ok(())
}

fn version_for<'a>(
    descriptor: &'a Descriptor,
    field: Field<'_>,
    slot: Option<(bool, Option<usize>)>,
) -> Option<&'a str> {
    match field {
        Field::Project(_) => descriptor.coordinate().version(),
        Field::Parent(_) => descriptor.parent().and_then(|parent| parent.version()),
        Field::Entry(Entry::Dependency { .. }, _) => {
            let (managed, index) = slot?;
            let declarations = if managed {
                descriptor.managed_dependencies()
            } else {
                descriptor.dependencies()
            };
            declarations.get(index?).and_then(|d| d.version())
        }
        Field::Entry(Entry::Plugin, _) | Field::Module => None,
    }
}
