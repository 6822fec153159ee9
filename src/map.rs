//! SVG map loading, shape discovery and restyled serialization.
//!
//! The document is kept as its owned `quick-xml` event stream so it can be
//! written back unchanged except for the bound shapes and the injected
//! `<style>` block.

use crate::api::Client;
use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Cursor;

/// Element kinds eligible for binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Polyline,
    Path,
    Polygon,
    Rect,
    Circle,
    Ellipse,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Polyline,
        ShapeKind::Path,
        ShapeKind::Polygon,
        ShapeKind::Rect,
        ShapeKind::Circle,
        ShapeKind::Ellipse,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            ShapeKind::Polyline => "polyline",
            ShapeKind::Path => "path",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Rect => "rect",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
        }
    }
}

/// A bindable element: an allow-listed shape with a non-empty `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub id: String,
    pub kind: ShapeKind,
    event: usize,
    /// Event ranges of `<title>` children already present in the markup.
    titles: Vec<(usize, usize)>,
}

/// Inline presentation written onto a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill: String,
    pub fill_opacity: f64,
    pub stroke: String,
    pub stroke_width: f64,
}

const STYLED_PROPERTIES: [&str; 4] = ["fill", "fill-opacity", "stroke", "stroke-width"];

impl fmt::Display for ShapeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fill: {}; fill-opacity: {}; stroke: {}; stroke-width: {}",
            self.fill, self.fill_opacity, self.stroke, self.stroke_width
        )
    }
}

/// What to write for one shape when rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDecoration {
    pub style: ShapeStyle,
    /// Hover text, emitted as a `<title>` child.
    pub title: String,
}

/// Shared stylesheet: default stroke and the hover affordance.
pub fn base_stylesheet(stroke: &str, stroke_width: f64) -> String {
    let selectors = |suffix: &str| {
        ShapeKind::ALL
            .iter()
            .map(|k| format!("{}[id]{suffix}", k.tag()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "{} {{ stroke: {stroke}; stroke-width: {stroke_width}; cursor: pointer; transition: filter 0.15s ease-in-out; }}\n\
         {} {{ filter: brightness(1.15) drop-shadow(0 0 3px rgba(0, 0, 0, 0.45)); }}",
        selectors(""),
        selectors(":hover"),
    )
}

/// An element that is open while parsing.
struct Open {
    start: usize,
    /// Index into the shape list when the element is a shape.
    shape: Option<usize>,
    /// Set for a `<title>` that is a direct child of that shape.
    title_of: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct MapDocument {
    events: Vec<Event<'static>>,
    shapes: Vec<Shape>,
    root: usize,
}

impl MapDocument {
    /// Fetch markup from a URL or path and parse it.
    pub fn load(client: &Client, source: &str) -> Result<Self> {
        let markup = client.fetch_text(source)?;
        let doc = Self::parse(&markup)?;
        log::info!("loaded map {source}: {} bindable shape(s)", doc.shapes.len());
        Ok(doc)
    }

    /// Parse markup that is already in memory.
    ///
    /// Shapes are only collected inside the root element.
    pub fn parse(markup: &str) -> Result<Self> {
        let mut reader = Reader::from_str(markup);
        let mut events = Vec::new();
        let mut shapes: Vec<Shape> = Vec::new();
        let mut root = None;
        let mut open: Vec<Open> = Vec::new();

        loop {
            let ev = reader.read_event()?;
            let at = events.len();
            match &ev {
                Event::Eof => break,
                Event::Start(e) | Event::Empty(e) => {
                    let tag = local_name(e)?;
                    let parent_shape = open.last().and_then(|o| o.shape);
                    let mut this = Open {
                        start: at,
                        shape: None,
                        title_of: None,
                    };
                    if root.is_none() {
                        if tag != "svg" {
                            return Err(Error::Parse(format!(
                                "root element is <{tag}>, expected <svg>"
                            )));
                        }
                        root = Some(at);
                    } else if open.is_empty() {
                        log::debug!("ignoring <{tag}> outside the root element");
                    } else if tag == "title"
                        && let Some(k) = parent_shape
                    {
                        this.title_of = Some(k);
                    } else if let Some(kind) = ShapeKind::from_tag(&tag)
                        && let Some(id) = attribute(e, "id")?
                        && !id.trim().is_empty()
                    {
                        this.shape = Some(shapes.len());
                        shapes.push(Shape {
                            id,
                            kind,
                            event: at,
                            titles: Vec::new(),
                        });
                    }
                    if matches!(ev, Event::Start(_)) {
                        open.push(this);
                    } else if let Some(k) = this.title_of {
                        shapes[k].titles.push((at, at));
                    }
                }
                Event::End(_) => {
                    if let Some(o) = open.pop()
                        && let Some(k) = o.title_of
                    {
                        shapes[k].titles.push((o.start, at));
                    }
                }
                _ => {}
            }
            events.push(ev.into_owned());
        }

        let root = root.ok_or_else(|| Error::Parse("document has no root element".into()))?;
        if !open.is_empty() {
            return Err(Error::Parse("unexpected end of document".into()));
        }
        Ok(Self {
            events,
            shapes,
            root,
        })
    }

    /// Bindable shapes in document order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Serialize with `stylesheet` as the root's first child and each shape in
    /// `decorations` (parallel to [`Self::shapes`]) restyled.
    pub fn render(&self, stylesheet: &str, decorations: &[ShapeDecoration]) -> Result<String> {
        let by_event: HashMap<usize, &ShapeDecoration> = self
            .shapes
            .iter()
            .zip(decorations)
            .map(|(s, d)| (s.event, d))
            .collect();
        // Existing titles of decorated shapes are replaced by the new one.
        let replaced: HashSet<usize> = self
            .shapes
            .iter()
            .take(decorations.len())
            .flat_map(|s| s.titles.iter().flat_map(|&(a, b)| a..=b))
            .collect();

        let mut w = Writer::new(Cursor::new(Vec::new()));
        for (i, ev) in self.events.iter().enumerate() {
            if replaced.contains(&i) {
                continue;
            }
            if i == self.root {
                match ev {
                    Event::Start(e) => {
                        w.write_event(Event::Start(e.clone()))?;
                        write_element(&mut w, "style", stylesheet)?;
                    }
                    Event::Empty(e) => {
                        w.write_event(Event::Start(e.clone()))?;
                        write_element(&mut w, "style", stylesheet)?;
                        w.write_event(Event::End(BytesEnd::new(qualified_name(e)?)))?;
                    }
                    other => w.write_event(other.clone())?,
                }
                continue;
            }
            match (by_event.get(&i), ev) {
                (Some(d), Event::Start(e)) => {
                    w.write_event(Event::Start(restyled(e, &d.style)?))?;
                    write_element(&mut w, "title", &d.title)?;
                }
                (Some(d), Event::Empty(e)) => {
                    w.write_event(Event::Start(restyled(e, &d.style)?))?;
                    write_element(&mut w, "title", &d.title)?;
                    w.write_event(Event::End(BytesEnd::new(qualified_name(e)?)))?;
                }
                (_, other) => w.write_event(other.clone())?,
            }
        }
        String::from_utf8(w.into_inner().into_inner())
            .map_err(|e| Error::Render(format!("svg output is not UTF-8: {e}")))
    }
}

fn local_name(e: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(e.local_name().as_ref())
        .map(str::to_string)
        .map_err(|err| Error::Parse(format!("element name is not UTF-8: {err}")))
}

fn qualified_name(e: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|err| Error::Parse(format!("element name is not UTF-8: {err}")))
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    match e.try_get_attribute(key)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Copy of `e` whose `style` attribute carries `style`, keeping unrelated declarations.
fn restyled(e: &BytesStart<'_>, style: &ShapeStyle) -> Result<BytesStart<'static>> {
    let mut out = BytesStart::new(qualified_name(e)?);
    let mut existing = None;
    for a in e.attributes() {
        let a = a?;
        if a.key.as_ref() == b"style" {
            existing = Some(a.unescape_value()?.into_owned());
        } else {
            out.push_attribute(a);
        }
    }
    let merged = merge_inline_style(existing.as_deref(), style);
    out.push_attribute(("style", merged.as_str()));
    Ok(out)
}

fn merge_inline_style(existing: Option<&str>, style: &ShapeStyle) -> String {
    let mut decls: Vec<String> = existing
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .filter(|d| {
            let prop = d.split(':').next().unwrap_or_default().trim();
            !STYLED_PROPERTIES.contains(&prop)
        })
        .map(str::to_string)
        .collect();
    decls.push(style.to_string());
    decls.join("; ")
}

fn write_element(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(tag)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
  <g id="layer">
    <path id="R1" d="M0 0 L10 0 L10 10 Z" style="fill: red; opacity: 0.5"/>
    <rect id="R2" x="20" y="0" width="10" height="10"></rect>
    <circle cx="5" cy="5" r="2"/>
    <text id="label">R1</text>
    <ellipse id="" cx="1" cy="1" rx="1" ry="1"/>
  </g>
</svg>"##;

    fn style() -> ShapeStyle {
        ShapeStyle {
            fill: "#3366FF".into(),
            fill_opacity: 0.8,
            stroke: "#333333".into(),
            stroke_width: 0.5,
        }
    }

    #[test]
    fn finds_only_allow_listed_shapes_with_ids() {
        let doc = MapDocument::parse(SAMPLE).unwrap();
        let found: Vec<_> = doc.shapes().iter().map(|s| (s.id.as_str(), s.kind)).collect();
        assert_eq!(found, vec![("R1", ShapeKind::Path), ("R2", ShapeKind::Rect)]);
    }

    #[test]
    fn non_svg_root_is_rejected() {
        let e = MapDocument::parse("<html><path id=\"a\"/></html>").unwrap_err();
        assert!(matches!(e, Error::Parse(_)));
    }

    #[test]
    fn malformed_markup_is_rejected() {
        assert!(matches!(
            MapDocument::parse("<svg><path id=\"a\"></svg>"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(MapDocument::parse("<svg><g>"), Err(Error::Parse(_))));
        assert!(matches!(MapDocument::parse(""), Err(Error::Parse(_))));
    }

    #[test]
    fn style_block_is_first_child_of_root() {
        let doc = MapDocument::parse(SAMPLE).unwrap();
        let decorations = vec![
            ShapeDecoration {
                style: style(),
                title: "North".into(),
            };
            2
        ];
        let out = doc.render("path { stroke: black; }", &decorations).unwrap();
        let root_end = out.find("viewBox=\"0 0 100 100\">").unwrap();
        let style_at = out.find("<style>").unwrap();
        assert!(style_at > root_end);
        assert!(!out[root_end..style_at].contains('<'));
        assert_eq!(out.matches("<style>").count(), 1);
    }

    #[test]
    fn shapes_get_inline_style_and_title() {
        let doc = MapDocument::parse(SAMPLE).unwrap();
        let decorations = vec![
            ShapeDecoration {
                style: style(),
                title: "North & co".into(),
            },
            ShapeDecoration {
                style: style(),
                title: "South".into(),
            },
        ];
        let out = doc.render("", &decorations).unwrap();
        assert!(out.contains(
            "style=\"opacity: 0.5; fill: #3366FF; fill-opacity: 0.8; stroke: #333333; stroke-width: 0.5\""
        ));
        assert!(out.contains("<title>North &amp; co</title></path>"));
        assert!(out.contains("<title>South</title></rect>"));
        assert!(!out.contains("fill: red"));
        // unbound elements pass through untouched
        assert!(out.contains("<circle cx=\"5\" cy=\"5\" r=\"2\"/>"));
        // output is itself a loadable map
        let again = MapDocument::parse(&out).unwrap();
        assert_eq!(again.shapes().len(), 2);
    }

    #[test]
    fn existing_shape_titles_are_replaced() {
        let doc = MapDocument::parse(
            r#"<svg><path id="R1" d="M0 0"><title>Old name</title><desc>kept</desc></path><g><title>Group</title></g></svg>"#,
        )
        .unwrap();
        let decorations = [ShapeDecoration {
            style: style(),
            title: "New name".into(),
        }];
        let out = doc.render("", &decorations).unwrap();
        assert!(!out.contains("Old name"));
        assert_eq!(out.matches("<title>New name</title>").count(), 1);
        assert!(out.contains("<desc>kept</desc>"));
        assert!(out.contains("<title>Group</title>"));

        let again = MapDocument::parse(&out).unwrap().render("", &decorations).unwrap();
        assert_eq!(again.matches("<title>").count(), 2);
    }

    #[test]
    fn elements_after_the_root_are_not_shapes() {
        let doc = MapDocument::parse(r#"<svg><rect id="in"/></svg><path id="out" d="M0 0"/>"#)
            .unwrap();
        let ids: Vec<_> = doc.shapes().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["in"]);
    }

    #[test]
    fn stylesheet_covers_every_kind() {
        let css = base_stylesheet("#333333", 0.5);
        for k in ShapeKind::ALL {
            assert!(css.contains(&format!("{}[id]:hover", k.tag())));
        }
        assert!(css.contains("stroke-width: 0.5"));
    }
}
