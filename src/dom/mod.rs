//! Document tree module
//!
//! This module provides the tree model the transforms work on. It includes:
//! - Element/Node: element handles with identity, text and comment nodes
//! - Root/Parent: the document anchor and parent lookup by search
//! - Selector: CSS selectors evaluated against a tree or subtree

pub mod element;
pub mod selector;
pub mod tree;

pub use element::{Comment, Doctype, Element, ElementData, Node, PropertyItem, PropertyValue, Raw, Text};
pub use selector::{select_all, select_first, Selector};
pub use tree::{find_parent, Parent, Root};
