//! CSS selectors evaluated against [`Root`] trees.
//!
//! Parsing and matching are done by the `selectors` engine; this module only exposes
//! the tree to it. Elements keep no back-references, so every element handed to the
//! engine carries the chain of ancestors it was reached through. Matches are always
//! returned in document pre-order.

use crate::dom::element::{Element, Node};
use crate::dom::tree::Root;
use crate::error::{CaptionError, Result};
use cssparser::ToCss;
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{self, ElementSelectorFlags, MatchingContext};
use selectors::parser::{self, SelectorList, SelectorParseErrorKind};
use selectors::{NthIndexCache, OpaqueElement};
use std::fmt;
use std::rc::Rc;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Tag of the synthetic element standing in for the tree root or a search scope
const CONTAINER_TAG: &str = "#container";

/// A parsed selector list
#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    selectors: Vec<parser::Selector<Simple>>,
}

impl Selector {
    /// Parse a selector list such as `article picture:has(img[title]), img.wide`
    pub fn parse(source: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(source);
        let mut css = cssparser::Parser::new(&mut input);
        let list = SelectorList::parse(&SelectorParser, &mut css, parser::ParseRelative::No)
            .map_err(|err| {
                CaptionError::invalid_selector(
                    source,
                    format!(
                        "{:?} at line {}, column {}",
                        err.kind, err.location.line, err.location.column
                    ),
                )
            })?;

        Ok(Self {
            source: source.to_string(),
            selectors: list.0.into_iter().collect(),
        })
    }

    /// The selector text this was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn matches(&self, element: &TreeElement) -> bool {
        let mut nth_index_cache = NthIndexCache::default();
        let mut context = MatchingContext::new(
            matching::MatchingMode::Normal,
            None,
            &mut nth_index_cache,
            matching::QuirksMode::NoQuirks,
            matching::NeedsSelectorFlags::No,
            matching::IgnoreNthChildForInvalidation::No,
        );
        self.selectors
            .iter()
            .any(|selector| matching::matches_selector(selector, 0, None, element, &mut context))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Every element of `tree` matching `selector`, in document order.
///
/// The result is a snapshot: mutating the tree afterwards does not change it.
pub fn select_all(selector: &Selector, tree: &Root) -> Vec<Element> {
    let container = TreeElement::container(tree.children.clone());
    let mut found = Vec::new();
    collect(&container, selector, &mut found, false);
    found
}

/// First descendant of `scope` matching `selector`.
///
/// `scope` itself is never returned but takes part in combinator matching, so
/// `picture > img` finds the image of a `picture` scope.
pub fn select_first(selector: &Selector, scope: &Element) -> Option<Element> {
    let container = TreeElement::container(vec![scope.clone().into()]);
    let scope = Rc::new(TreeElement {
        element: scope.clone(),
        parent: Some(container),
    });
    let mut found = Vec::new();
    collect(&scope, selector, &mut found, true);
    found.into_iter().next()
}

/// Pre-order walk below `parent`; returns true once collection should stop
fn collect(
    parent: &Rc<TreeElement>,
    selector: &Selector,
    found: &mut Vec<Element>,
    first_only: bool,
) -> bool {
    let children: Vec<Element> = parent
        .element
        .borrow()
        .children
        .iter()
        .filter_map(Node::as_element)
        .cloned()
        .collect();

    for element in children {
        let current = Rc::new(TreeElement {
            element,
            parent: Some(Rc::clone(parent)),
        });
        if selector.matches(&current) {
            found.push(current.element.clone());
            if first_only {
                return true;
            }
        }
        if collect(&current, selector, found, first_only) {
            return true;
        }
    }
    false
}

/// An element plus the ancestors it was reached through.
///
/// The outermost link is a synthetic container holding the nodes being searched; it
/// is never exposed to the engine as an element.
#[derive(Debug, Clone)]
struct TreeElement {
    element: Element,
    parent: Option<Rc<TreeElement>>,
}

enum Direction {
    Previous,
    Next,
}

impl TreeElement {
    fn container(children: Vec<Node>) -> Rc<Self> {
        Rc::new(Self {
            element: Element::new(CONTAINER_TAG).with_children(children),
            parent: None,
        })
    }

    fn sibling_element(&self, direction: Direction) -> Option<Self> {
        let parent = self.parent.as_ref()?;
        let data = parent.element.borrow();
        let index = data
            .children
            .iter()
            .position(|child| child.is_same_element(&self.element))?;

        let sibling = match direction {
            Direction::Previous => data.children[..index]
                .iter()
                .rev()
                .find_map(Node::as_element),
            Direction::Next => data.children[index + 1..].iter().find_map(Node::as_element),
        }
        .cloned();

        sibling.map(|element| Self {
            element,
            parent: Some(Rc::clone(parent)),
        })
    }
}

impl selectors::Element for TreeElement {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.element.cell())
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.parent.as_ref()?;
        parent.parent.is_some().then(|| TreeElement::clone(parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(Direction::Previous)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(Direction::Next)
    }

    fn first_element_child(&self) -> Option<Self> {
        let child = self
            .element
            .borrow()
            .children
            .iter()
            .find_map(Node::as_element)
            .cloned();

        child.map(|element| Self {
            element,
            parent: Some(Rc::new(self.clone())),
        })
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &CssLocalName) -> bool {
        self.element.is_tag(&local_name.0)
    }

    fn has_namespace(&self, ns: &CssLocalName) -> bool {
        ns.0.is_empty() || ns.0 == HTML_NAMESPACE
    }

    fn is_same_type(&self, other: &Self) -> bool {
        other.element.is_tag(&self.element.borrow().tag_name)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssLocalName>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        if let NamespaceConstraint::Specific(url) = ns {
            if !url.0.is_empty() {
                return false;
            }
        }
        let data = self.element.borrow();
        let matched = data
            .attribute_value(&local_name.0)
            .is_some_and(|value| operation.eval_str(&value));
        matched
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NoPseudoClass,
        _context: &mut MatchingContext<'_, Simple>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &NoPseudoElement,
        _context: &mut MatchingContext<'_, Simple>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        let data = self.element.borrow();
        let matched = data
            .attribute_value("id")
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.0.as_bytes()));
        matched
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        let data = self.element.borrow();
        let matched = data
            .classes()
            .any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()));
        matched
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        let data = self.element.borrow();
        let empty = data.children.iter().all(|child| match child {
            Node::Element(_) => false,
            Node::Text(text) => text.value.is_empty(),
            Node::Raw(raw) => raw.value.is_empty(),
            Node::Comment(_) | Node::Doctype(_) => true,
        });
        empty
    }

    fn is_root(&self) -> bool {
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.parent.is_none())
    }
}

/// Selector implementation without pseudo-classes or pseudo-elements of its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Simple;

impl parser::SelectorImpl for Simple {
    type ExtraMatchingData<'a> = ();
    type AttrValue = CssString;
    type Identifier = CssLocalName;
    type LocalName = CssLocalName;
    type NamespacePrefix = CssLocalName;
    type NamespaceUrl = CssLocalName;
    type BorrowedNamespaceUrl = CssLocalName;
    type BorrowedLocalName = CssLocalName;
    type NonTSPseudoClass = NoPseudoClass;
    type PseudoElement = NoPseudoElement;
}

struct SelectorParser;

impl<'i> parser::Parser<'i> for SelectorParser {
    type Impl = Simple;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_is_and_where(&self) -> bool {
        true
    }

    fn parse_has(&self) -> bool {
        true
    }
}

/// Attribute value inside a selector
#[derive(Debug, Clone, PartialEq, Eq)]
struct CssString(String);

impl<'a> From<&'a str> for CssString {
    fn from(value: &'a str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for CssString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssString {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        cssparser::serialize_string(&self.0, dest)
    }
}

/// Tag, attribute, id, class or namespace name inside a selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CssLocalName(String);

impl<'a> From<&'a str> for CssLocalName {
    fn from(value: &'a str) -> Self {
        Self(value.to_owned())
    }
}

impl ToCss for CssLocalName {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        cssparser::serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for CssLocalName {
    // FNV-1a
    fn precomputed_hash(&self) -> u32 {
        self.0.bytes().fold(0x811c_9dc5, |hash, byte| {
            (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NoPseudoClass {}

impl parser::NonTSPseudoClass for NoPseudoClass {
    type Impl = Simple;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl ToCss for NoPseudoClass {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NoPseudoElement {}

impl parser::PseudoElement for NoPseudoElement {
    type Impl = Simple;
}

impl ToCss for NoPseudoElement {
    fn to_css<W>(&self, _dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {}
    }
}
