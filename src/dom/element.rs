use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// A node that can appear in a child sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
    Doctype(Doctype),
    /// Markup passed through verbatim, as produced by markdown-to-HTML pipelines
    Raw(Raw),
}

/// Text content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
}

/// Comment content, kept so it survives a round trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub value: String,
}

/// Document type declaration. Current hast trees omit the name; older ones carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctype {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raw {
    pub value: String,
}

/// Attribute value as carried by a document tree. `Null` means the attribute is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    List(Vec<PropertyItem>),
}

/// One entry of a list-valued attribute such as `className` or `coords`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyItem {
    Number(f64),
    String(String),
}

/// Attributes whose list values are joined with commas rather than spaces
const COMMA_SEPARATED: &[&str] = &["accept", "coords"];

/// Element payload: tag name, attributes and children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementData {
    /// HTML tag name (e.g., "img", "picture", "p")
    pub tag_name: String,

    /// Element attributes, in source order
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,

    /// Child nodes
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Shared handle to an element.
///
/// Cloning the handle keeps identity: both clones refer to the same element, and
/// [`Element::ptr_eq`] tells them apart from a structurally equal copy. `==` compares
/// structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Element(Rc<RefCell<ElementData>>);

impl Element {
    /// Create a new element with no attributes or children
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            tag_name: tag_name.into(),
            properties: IndexMap::new(),
            children: Vec::new(),
        })))
    }

    /// Builder method: set an attribute
    pub fn with_attribute(self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder method: append a child
    pub fn with_child(self, child: impl Into<Node>) -> Self {
        self.0.borrow_mut().children.push(child.into());
        self
    }

    /// Builder method: set children
    pub fn with_children(self, children: Vec<Node>) -> Self {
        self.0.borrow_mut().children = children;
        self
    }

    pub fn borrow(&self) -> Ref<'_, ElementData> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ElementData> {
        self.0.borrow_mut()
    }

    /// Whether both handles refer to the very same element
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn cell(&self) -> &RefCell<ElementData> {
        &self.0
    }

    pub fn tag_name(&self) -> String {
        self.0.borrow().tag_name.clone()
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.0.borrow().is_tag(tag)
    }

    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.0.borrow_mut().properties.insert(key.into(), value.into());
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<PropertyValue> {
        self.0.borrow().properties.get(key).cloned()
    }

    /// Get an attribute only if it holds a string
    pub fn string_attribute(&self, key: &str) -> Option<String> {
        match self.0.borrow().properties.get(key) {
            Some(PropertyValue::String(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Remove an attribute, keeping the order of the others
    pub fn remove_attribute(&self, key: &str) -> Option<PropertyValue> {
        self.0.borrow_mut().properties.shift_remove(key)
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }
}

impl ElementData {
    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Attribute as HTML would carry it; `class` also reads hast's `className`
    pub fn attribute_value(&self, key: &str) -> Option<Cow<'_, str>> {
        let value = match self.properties.get(key) {
            None if key == "class" => self.properties.get("className"),
            value => value,
        };
        value.and_then(|value| value.as_attribute_value(key))
    }

    /// Classes from `class` (or hast's `className`)
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        let value = self
            .properties
            .get("class")
            .or_else(|| self.properties.get("className"));
        let single = match value {
            Some(PropertyValue::String(s)) => Some(s.as_str()),
            _ => None,
        };
        let list: &[PropertyItem] = match value {
            Some(PropertyValue::List(items)) => items,
            _ => &[],
        };
        single
            .into_iter()
            .chain(list.iter().filter_map(PropertyItem::as_str))
            .flat_map(str::split_whitespace)
    }
}

impl PropertyValue {
    /// String form of the attribute `key` used for matching and rendering; `None` when unset
    pub fn as_attribute_value(&self, key: &str) -> Option<Cow<'_, str>> {
        match self {
            PropertyValue::String(s) => Some(Cow::Borrowed(s)),
            PropertyValue::List(items) => {
                let separator = if COMMA_SEPARATED.contains(&key) { "," } else { " " };
                let parts: Vec<String> = items.iter().map(PropertyItem::to_string).collect();
                Some(Cow::Owned(parts.join(separator)))
            }
            PropertyValue::Boolean(true) => Some(Cow::Borrowed("")),
            PropertyValue::Boolean(false) | PropertyValue::Null => None,
            PropertyValue::Number(n) => Some(Cow::Owned(n.to_string())),
        }
    }
}

impl PropertyItem {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyItem::String(s) => Some(s),
            PropertyItem::Number(_) => None,
        }
    }
}

impl fmt::Display for PropertyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyItem::String(s) => f.write_str(s),
            PropertyItem::Number(n) => write!(f, "{}", n),
        }
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text { value: value.into() })
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Node::Comment(Comment { value: value.into() })
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Whether this node is exactly `target` (identity, not structure)
    pub fn is_same_element(&self, target: &Element) -> bool {
        matches!(self, Node::Element(el) if el.ptr_eq(target))
    }

    /// Text made only of HTML inter-element whitespace (or nothing at all)
    pub fn is_whitespace_text(&self) -> bool {
        match self {
            Node::Text(text) => text
                .value
                .chars()
                .all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')),
            _ => false,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::List(value.into_iter().map(PropertyItem::String).collect())
    }
}

impl From<Vec<f64>> for PropertyValue {
    fn from(value: Vec<f64>) -> Self {
        PropertyValue::List(value.into_iter().map(PropertyItem::Number).collect())
    }
}
