use crate::dom::element::{Element, Node};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Root of a document tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    /// Top-level nodes of the document
    #[serde(default)]
    pub children: Vec<Node>,
}

/// The node whose child sequence holds a given element
#[derive(Debug, Clone)]
pub enum Parent {
    Root,
    Element(Element),
}

impl Root {
    /// Create a new root with the given children
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Parse a tree from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert the tree to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the tree as HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            render_node(child, &mut out);
        }
        out
    }
}

impl Parent {
    /// Whether the parent is an element with the given tag
    pub fn is_tag(&self, tag: &str) -> bool {
        match self {
            Parent::Root => false,
            Parent::Element(el) => el.is_tag(tag),
        }
    }

    /// Run `f` on the parent's child sequence
    pub fn with_children<R>(&self, tree: &mut Root, f: impl FnOnce(&mut Vec<Node>) -> R) -> R {
        match self {
            Parent::Root => f(&mut tree.children),
            Parent::Element(el) => f(&mut el.borrow_mut().children),
        }
    }
}

/// Find the parent of `target` by searching the tree from its root.
///
/// Nodes carry no back-references, so this walks the tree in pre-order and costs
/// O(tree size). Returns `None` only when `target` is not reachable from `tree`.
pub fn find_parent(target: &Element, tree: &Root) -> Option<Parent> {
    if holds_child(&tree.children, target) {
        return Some(Parent::Root);
    }
    find_parent_recursive(&tree.children, target).map(Parent::Element)
}

fn find_parent_recursive(children: &[Node], target: &Element) -> Option<Element> {
    for el in children.iter().filter_map(Node::as_element) {
        let data = el.borrow();
        if holds_child(&data.children, target) {
            return Some(el.clone());
        }
        if let Some(found) = find_parent_recursive(&data.children, target) {
            return Some(found);
        }
    }
    None
}

fn holds_child(children: &[Node], target: &Element) -> bool {
    children.iter().any(|child| child.is_same_element(target))
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&html_escape::encode_text(&text.value)),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.value);
            out.push_str("-->");
        }
        Node::Doctype(doctype) => {
            out.push_str("<!doctype ");
            out.push_str(doctype.name.as_deref().unwrap_or("html"));
            out.push('>');
        }
        Node::Raw(raw) => out.push_str(&raw.value),
        Node::Element(el) => {
            let data = el.borrow();
            out.push('<');
            out.push_str(&data.tag_name);
            for (key, value) in &data.properties {
                let Some(value) = value.as_attribute_value(key) else {
                    continue;
                };
                let name = if key == "className" { "class" } else { key.as_str() };
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(&value));
                    out.push('"');
                }
            }
            out.push('>');

            if VOID_ELEMENTS.iter().any(|tag| data.is_tag(tag)) {
                return;
            }

            for child in &data.children {
                render_node(child, out);
            }
            out.push_str("</");
            out.push_str(&data.tag_name);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::element::Raw;

    fn create_test_tree() -> (Root, Element, Element) {
        let img = Element::new("img").with_attribute("src", "a.jpg");
        let paragraph = Element::new("p")
            .with_child(Node::text("Intro "))
            .with_child(img.clone());
        let article = Element::new("article").with_child(paragraph.clone());

        (Root::new(vec![article.into()]), paragraph, img)
    }

    #[test]
    fn test_find_parent() {
        let (tree, paragraph, img) = create_test_tree();

        match find_parent(&img, &tree) {
            Some(Parent::Element(parent)) => assert!(parent.ptr_eq(&paragraph)),
            other => panic!("Expected paragraph parent, got {:?}", other),
        }
    }

    #[test]
    fn test_find_parent_at_root() {
        let img = Element::new("img");
        let tree = Root::new(vec![Node::text("\n"), img.clone().into()]);

        assert!(matches!(find_parent(&img, &tree), Some(Parent::Root)));
    }

    #[test]
    fn test_find_parent_uses_identity() {
        let (tree, _, _) = create_test_tree();
        let lookalike = Element::new("img").with_attribute("src", "a.jpg");

        assert!(find_parent(&lookalike, &tree).is_none());
    }

    #[test]
    fn test_with_children() {
        let (mut tree, paragraph, _) = create_test_tree();
        let parent = Parent::Element(paragraph.clone());

        parent.with_children(&mut tree, |children| children.push(Node::text("!")));
        assert_eq!(paragraph.child_count(), 3);

        Parent::Root.with_children(&mut tree, |children| children.clear());
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_to_html() {
        let (tree, _, img) = create_test_tree();
        img.set_attribute("alt", "\"quoted\" & more");
        img.set_attribute("hidden", true);
        img.set_attribute("draggable", false);

        assert_eq!(
            tree.to_html(),
            "<article><p>Intro <img src=\"a.jpg\" alt=\"&quot;quoted&quot; &amp; more\" hidden></p></article>"
        );
    }

    #[test]
    fn test_json_round_trip() {
        let (tree, _, _) = create_test_tree();
        let json = tree.to_json().unwrap();

        assert!(json.contains("\"tagName\": \"article\""));
        assert_eq!(Root::from_json(&json).unwrap(), tree);
    }

    #[test]
    fn test_from_json_full_document() {
        let json = r#"{
            "type": "root",
            "children": [
                {"type": "doctype"},
                {"type": "element", "tagName": "html", "properties": {"lang": "en"}, "children": [
                    {"type": "element", "tagName": "body", "properties": {}, "children": [
                        {"type": "element", "tagName": "img",
                         "properties": {"src": "a.png", "alt": null, "coords": [1, 2]},
                         "children": [],
                         "position": {"start": {"line": 1, "column": 1}}}
                    ]}
                ]}
            ]
        }"#;

        let tree = Root::from_json(json).unwrap();
        assert_eq!(
            tree.to_html(),
            "<!doctype html><html lang=\"en\"><body><img src=\"a.png\" coords=\"1,2\"></body></html>"
        );
        assert_eq!(Root::from_json(&tree.to_json().unwrap()).unwrap(), tree);
    }

    #[test]
    fn test_raw_nodes_render_verbatim() {
        let tree = Root::new(vec![Node::Raw(Raw {
            value: "<b>bold</b> & more".to_string(),
        })]);

        assert_eq!(tree.to_html(), "<b>bold</b> & more");
    }

    #[test]
    fn test_from_json_rejects_unknown_node_type() {
        let json = r#"{"children": [{"type": "mdxJsxFlowElement"}]}"#;
        assert!(Root::from_json(json).is_err());
    }
}
