//! # image-title-captions
//!
//! A Rust library that turns image titles into visible captions in a parsed document tree.
//!
//! ## Features
//!
//! - **Captions from titles**: images (or picture-like containers) with a `title` are wrapped
//!   in `<figure>` and the title becomes a `<figcaption>`
//! - **Paragraph repair**: a `<figure>` cannot live inside `<p>`, so new figures are lifted
//!   out of their paragraph whenever that is possible
//! - **Selectors**: which elements are captioned is configured with CSS selectors such as
//!   `article picture:has(img[title])`, matched by the `selectors` engine
//! - **JSON trees**: documents are read and written as hast JSON, doctype and raw nodes
//!   included
//!
//! ## Library Usage
//!
//! ### Captioning a Tree
//!
//! ```rust
//! use image_title_captions::{CaptionOptions, Element, ImageTitlesToCaptions, Root, Transform};
//!
//! # fn main() -> image_title_captions::Result<()> {
//! let image = Element::new("img")
//!     .with_attribute("src", "cat.jpg")
//!     .with_attribute("title", "A cat");
//! let mut tree = Root::new(vec![Element::new("p").with_child(image).into()]);
//!
//! let transform = ImageTitlesToCaptions::new(CaptionOptions::default())?;
//! transform.apply(&mut tree)?;
//!
//! assert_eq!(
//!     tree.to_html(),
//!     "<figure><img src=\"cat.jpg\"><figcaption>A cat</figcaption></figure>"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ### Pictures and Options
//!
//! ```rust
//! use image_title_captions::{CaptionOptions, ImageTitlesToCaptions};
//!
//! # fn main() -> image_title_captions::Result<()> {
//! let options = CaptionOptions::new()
//!     .picture_selector("article picture:has(img[title])")
//!     .delete_titles(false);
//! let transform = ImageTitlesToCaptions::new(options)?;
//! # let _ = transform;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: Tree model, parent lookup and selector matching
//! - [`transform`]: The captioning transform and its options
//! - [`error`]: Error types and result aliases

pub mod dom;
pub mod error;
pub mod transform;

pub use dom::{
    find_parent, select_all, select_first, Element, Node, Parent, PropertyItem, PropertyValue, Root,
    Selector,
};
pub use error::{CaptionError, Result};
pub use transform::{CaptionOptions, CaptionReport, ImageTitlesToCaptions, Placement, Transform};
