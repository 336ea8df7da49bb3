use crate::dom::Selector;
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Image selector used when none is configured
pub const DEFAULT_IMG_SELECTOR: &str = "img";

/// Options for [`ImageTitlesToCaptions`](crate::transform::ImageTitlesToCaptions).
///
/// Every field is optional; unset or empty selectors fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionOptions {
    /// Selector for the outer elements to wrap, e.g. `picture`. Defaults to `imgSelector`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_selector: Option<String>,

    /// Selector for the image holding the title, inside (or as) each outer element.
    /// Defaults to `img`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_selector: Option<String>,

    /// Remove the title attribute once its caption exists (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_titles: Option<bool>,
}

/// Options with defaults applied and selectors parsed
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub picture_selector: Selector,
    pub img_selector: Selector,
    pub delete_titles: bool,
}

impl CaptionOptions {
    /// Create options with every field defaulted
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the outer element selector
    pub fn picture_selector(mut self, selector: impl Into<String>) -> Self {
        self.picture_selector = Some(selector.into());
        self
    }

    /// Builder method: set the image selector
    pub fn img_selector(mut self, selector: impl Into<String>) -> Self {
        self.img_selector = Some(selector.into());
        self
    }

    /// Builder method: set whether titles are deleted
    pub fn delete_titles(mut self, delete: bool) -> Self {
        self.delete_titles = Some(delete);
        self
    }

    /// Load options from JSON such as `{"pictureSelector": "picture", "deleteTitles": false}`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlay `other` on top of these options; fields set in `other` win
    pub fn merge(self, other: CaptionOptions) -> Self {
        Self {
            picture_selector: other.picture_selector.or(self.picture_selector),
            img_selector: other.img_selector.or(self.img_selector),
            delete_titles: other.delete_titles.or(self.delete_titles),
        }
    }

    /// Apply defaults and parse both selectors
    pub fn resolve(&self) -> Result<ResolvedOptions> {
        let img_source = non_empty(self.img_selector.as_deref()).unwrap_or(DEFAULT_IMG_SELECTOR);
        let picture_source = non_empty(self.picture_selector.as_deref()).unwrap_or(img_source);

        Ok(ResolvedOptions {
            picture_selector: Selector::parse(picture_source)?,
            img_selector: Selector::parse(img_source)?,
            delete_titles: self.delete_titles.unwrap_or(true),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptionError;

    #[test]
    fn test_defaults() {
        let resolved = CaptionOptions::new().resolve().unwrap();

        assert_eq!(resolved.img_selector.as_str(), "img");
        assert_eq!(resolved.picture_selector.as_str(), "img");
        assert!(resolved.delete_titles);
    }

    #[test]
    fn test_picture_selector_follows_img_selector() {
        let resolved = CaptionOptions::new()
            .img_selector("img.to-replace")
            .resolve()
            .unwrap();

        assert_eq!(resolved.picture_selector.as_str(), "img.to-replace");
    }

    #[test]
    fn test_empty_selectors_fall_back() {
        let resolved = CaptionOptions::new()
            .img_selector("")
            .picture_selector("")
            .delete_titles(false)
            .resolve()
            .unwrap();

        assert_eq!(resolved.img_selector.as_str(), "img");
        assert_eq!(resolved.picture_selector.as_str(), "img");
        assert!(!resolved.delete_titles);
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let err = CaptionOptions::new().picture_selector("picture:has(").resolve().unwrap_err();
        assert!(matches!(err, CaptionError::InvalidSelector { .. }));
    }

    #[test]
    fn test_from_json() {
        let options = CaptionOptions::from_json(
            r#"{"pictureSelector": "article picture", "deleteTitles": false}"#,
        )
        .unwrap();

        assert_eq!(options.picture_selector.as_deref(), Some("article picture"));
        assert_eq!(options.img_selector, None);
        assert_eq!(options.delete_titles, Some(false));

        assert_eq!(CaptionOptions::from_json("{}").unwrap(), CaptionOptions::default());
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = CaptionOptions::new().img_selector("img.a").delete_titles(false);
        let merged = base.merge(CaptionOptions::new().img_selector("img.b"));

        assert_eq!(merged.img_selector.as_deref(), Some("img.b"));
        assert_eq!(merged.delete_titles, Some(false));
    }

    #[test]
    fn test_schema_names_camel_case_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(CaptionOptions)).unwrap();
        let properties = &schema["properties"];

        assert!(properties.get("pictureSelector").is_some());
        assert!(properties.get("imgSelector").is_some());
        assert!(properties.get("deleteTitles").is_some());
    }
}
