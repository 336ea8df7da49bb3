use crate::dom::{find_parent, select_all, select_first, Element, Node, Parent, Root};
use crate::error::{CaptionError, Result};
use crate::transform::options::{CaptionOptions, ResolvedOptions};
use crate::transform::Transform;
use serde::Serialize;

/// Tag of an outer element that is itself the image
pub const IMAGE_TAG: &str = "img";

const PARAGRAPH_TAG: &str = "p";
const TITLE_ATTRIBUTE: &str = "title";

/// Where a new figure ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// The outer element's parent is not a paragraph; the figure took its place
    ReplaceInPlace,
    /// The paragraph held nothing else, so the figure replaced the paragraph
    ReplaceParagraph,
    /// The figure follows the paragraph, which keeps its remaining content
    InsertAfterParagraph,
    /// No way out of the paragraph; the figure stays inside it
    ParagraphFallback,
}

/// Outcome of one pass over a tree
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaptionReport {
    /// Elements matched by the picture selector
    pub candidates: usize,

    /// Placement of every figure created, in document order
    pub placements: Vec<Placement>,

    /// Candidates without an image carrying a usable title
    pub skipped: usize,
}

impl CaptionReport {
    pub fn captioned(&self) -> usize {
        self.placements.len()
    }
}

/// An outer element ready to be captioned
#[derive(Debug, Clone)]
pub struct CaptionMatch {
    pub outer: Element,
    pub image: Element,
    pub title: String,
}

/// Turns image titles into `<figure>`/`<figcaption>` pairs.
///
/// Markdown can give an image a title but not a caption. Titles only show on
/// mouseover, so a visible caption is more accessible.
#[derive(Debug, Clone)]
pub struct ImageTitlesToCaptions {
    options: ResolvedOptions,
}

impl ImageTitlesToCaptions {
    /// Resolve `options` once; fails on an invalid selector
    pub fn new(options: CaptionOptions) -> Result<Self> {
        Ok(Self {
            options: options.resolve()?,
        })
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Snapshot of the outer elements to examine, in document order
    pub fn candidates(&self, tree: &Root) -> Vec<Element> {
        select_all(&self.options.picture_selector, tree)
    }

    /// Find the image and title for `outer`, or `None` if there is nothing to caption
    pub fn resolve(&self, outer: &Element) -> Option<CaptionMatch> {
        // Exact tag comparison; hast tag names are lowercase
        let image = if outer.borrow().tag_name == IMAGE_TAG {
            outer.clone()
        } else {
            select_first(&self.options.img_selector, outer)?
        };

        let title = image
            .string_attribute(TITLE_ATTRIBUTE)
            .filter(|title| !title.is_empty())?;

        Some(CaptionMatch {
            outer: outer.clone(),
            image,
            title,
        })
    }
}

impl Transform for ImageTitlesToCaptions {
    type Report = CaptionReport;

    fn name(&self) -> &str {
        "image-titles-to-captions"
    }

    fn apply(&self, tree: &mut Root) -> Result<CaptionReport> {
        let candidates = self.candidates(tree);
        let mut report = CaptionReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        // Titles are read as each candidate is reached, so a title consumed by an
        // earlier candidate is not captioned twice.
        for outer in &candidates {
            let Some(found) = self.resolve(outer) else {
                log::trace!("Skipping <{}>: no image with a usable title", outer.tag_name());
                report.skipped += 1;
                continue;
            };

            let figure = build_figure(&found.outer, &found.title);
            let placement = place_figure(tree, &found.outer, figure)?;

            if self.options.delete_titles {
                found.image.remove_attribute(TITLE_ATTRIBUTE);
            }

            log::debug!(
                "Captioned <{}> ({:?}): {}",
                found.outer.tag_name(),
                placement,
                found.title
            );
            report.placements.push(placement);
        }

        Ok(report)
    }
}

/// `figure > (outer, figcaption > title)`, reusing `outer` itself rather than a copy
pub fn build_figure(outer: &Element, title: &str) -> Element {
    Element::new("figure")
        .with_child(outer.clone())
        .with_child(Element::new("figcaption").with_child(Node::text(title)))
}

/// Put `figure` where `outer` is, lifting it out of an enclosing paragraph when possible
pub fn place_figure(tree: &mut Root, outer: &Element, figure: Element) -> Result<Placement> {
    let parent = find_parent(outer, tree).ok_or_else(|| parent_not_found(outer))?;

    let paragraph = match parent {
        Parent::Element(el) if el.is_tag(PARAGRAPH_TAG) => el,
        other => {
            replace_child(tree, &other, outer, figure.into())?;
            return Ok(Placement::ReplaceInPlace);
        }
    };

    match find_parent(&paragraph, tree) {
        Some(grandparent) if !grandparent.is_tag(PARAGRAPH_TAG) => {
            if is_otherwise_empty(&paragraph, outer) {
                replace_child(tree, &grandparent, &paragraph, figure.into())?;
                Ok(Placement::ReplaceParagraph)
            } else {
                insert_after(tree, &grandparent, &paragraph, figure.into())?;
                let paragraph = Parent::Element(paragraph);
                paragraph
                    .with_children(tree, |children| {
                        let index = position_of(children, outer)?;
                        children.remove(index);
                        Some(())
                    })
                    .ok_or_else(|| parent_not_found(outer))?;
                Ok(Placement::InsertAfterParagraph)
            }
        }
        _ => {
            log::warn!(
                "Leaving <figure> for <{}> inside <p>: no non-paragraph ancestor to move it to",
                outer.tag_name()
            );
            replace_child(tree, &Parent::Element(paragraph), outer, figure.into())?;
            Ok(Placement::ParagraphFallback)
        }
    }
}

/// Whether the paragraph holds nothing but `outer` and whitespace-only text.
/// Comments and other elements count as content.
fn is_otherwise_empty(paragraph: &Element, outer: &Element) -> bool {
    paragraph
        .borrow()
        .children
        .iter()
        .all(|child| child.is_same_element(outer) || child.is_whitespace_text())
}

fn replace_child(tree: &mut Root, parent: &Parent, target: &Element, replacement: Node) -> Result<()> {
    parent
        .with_children(tree, |children| {
            let index = position_of(children, target)?;
            children[index] = replacement;
            Some(())
        })
        .ok_or_else(|| parent_not_found(target))
}

fn insert_after(tree: &mut Root, parent: &Parent, target: &Element, node: Node) -> Result<()> {
    parent
        .with_children(tree, |children| {
            let index = position_of(children, target)?;
            children.insert(index + 1, node);
            Some(())
        })
        .ok_or_else(|| parent_not_found(target))
}

fn position_of(children: &[Node], target: &Element) -> Option<usize> {
    children.iter().position(|child| child.is_same_element(target))
}

fn parent_not_found(target: &Element) -> CaptionError {
    CaptionError::ParentNotFound {
        tag_name: target.tag_name(),
    }
}
