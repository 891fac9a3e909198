//! # Generic XML Mapping
//!
//! Turns a vendor XML payload into a loose tree of maps, lists and text,
//! in the spirit of `xmltodict`. Attributes and namespaces are dropped;
//! elements are keyed by their local name.
//!
//! A repeated element becomes a [`XmlValue::List`]. An element that occurs
//! only once stays a bare value, unless the caller names it in
//! [`XmlParser::force_list`]. Repeatable elements must always be forced:
//! the parser never guesses cardinality from the parsed shape.

use std::collections::{BTreeMap, HashSet};

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed xml: {0}")]
    Malformed(#[from] quick_xml::Error),
    #[error("unexpected end of document inside <{0}>")]
    Unclosed(String),
    #[error("document has no root element")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    /// An element with neither text nor children.
    Null,
    Text(String),
    Map(BTreeMap<String, XmlValue>),
    List(Vec<XmlValue>),
}

impl XmlValue {
    /// Child element by name. `None` unless `self` is a map holding `key`.
    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        match self {
            XmlValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Follows a chain of element names from this node.
    pub fn path(&self, keys: &[&str]) -> Option<&XmlValue> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text content of the named child element.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(XmlValue::as_text).map(str::to_string)
    }

    /// Items of a list node. Only forced or repeated elements are lists.
    pub fn as_list(&self) -> Option<&[XmlValue]> {
        match self {
            XmlValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Parser configuration.
#[derive(Debug, Default, Clone)]
pub struct XmlParser {
    force_list: HashSet<String>,
}

struct Frame {
    name: String,
    children: BTreeMap<String, XmlValue>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: BTreeMap::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> (String, XmlValue) {
        let value = if !self.children.is_empty() {
            XmlValue::Map(self.children)
        } else if !self.text.is_empty() {
            XmlValue::Text(self.text)
        } else {
            XmlValue::Null
        };
        (self.name, value)
    }
}

impl XmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always yield a list for these element names, even for a single occurrence.
    pub fn force_list<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.force_list.extend(names.into_iter().map(Into::into));
        self
    }

    /// Parses `xml` into a single-entry map `{root_name: root_value}`.
    pub fn parse(&self, xml: &str) -> Result<XmlValue, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<Frame> = Vec::new();
        let mut root: BTreeMap<String, XmlValue> = BTreeMap::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    stack.push(Frame::new(name));
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    let parent = match stack.last_mut() {
                        Some(frame) => &mut frame.children,
                        None => &mut root,
                    };
                    self.insert(parent, name, XmlValue::Null);
                }
                Event::Text(e) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::End(_) => {
                    if let Some(frame) = stack.pop() {
                        let (name, value) = frame.into_value();
                        let parent = match stack.last_mut() {
                            Some(frame) => &mut frame.children,
                            None => &mut root,
                        };
                        self.insert(parent, name, value);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(frame) = stack.pop() {
            return Err(XmlError::Unclosed(frame.name));
        }
        if root.is_empty() {
            return Err(XmlError::Empty);
        }

        Ok(XmlValue::Map(root))
    }

    fn insert(&self, parent: &mut BTreeMap<String, XmlValue>, name: String, value: XmlValue) {
        let forced = self.force_list.contains(&name);

        match parent.remove(&name) {
            None if forced => {
                parent.insert(name, XmlValue::List(vec![value]));
            }
            None => {
                parent.insert(name, value);
            }
            Some(XmlValue::List(mut items)) => {
                items.push(value);
                parent.insert(name, XmlValue::List(items));
            }
            Some(previous) => {
                parent.insert(name, XmlValue::List(vec![previous, value]));
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
