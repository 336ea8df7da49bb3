//! Tree transforms
//!
//! A [`Transform`] mutates a [`Root`] in place during one synchronous pass and reports
//! what it did. The transforms keep no state between passes, so independent
//! documents can be processed by independent calls.
//!
//! - [`ImageTitlesToCaptions`]: wraps titled images in `<figure>` with a `<figcaption>`

pub mod captions;
pub mod options;

pub use captions::{
    build_figure, place_figure, CaptionMatch, CaptionReport, ImageTitlesToCaptions, Placement,
    IMAGE_TAG,
};
pub use options::{CaptionOptions, ResolvedOptions, DEFAULT_IMG_SELECTOR};

use crate::dom::Root;
use crate::error::Result;

/// A configured transform over document trees
pub trait Transform {
    /// Summary returned after each pass
    type Report;

    /// Name used in logs and by the command line
    fn name(&self) -> &str;

    /// Run one pass over `tree`. On error the pass stops and the tree must be discarded.
    fn apply(&self, tree: &mut Root) -> Result<Self::Report>;
}
