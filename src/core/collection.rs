//! Flat and tree views of the slides of a presentation.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use serde_yaml::Value;

use super::markup::MarkupConverter;
use super::slide::Slide;
use crate::error::{format_raw, Result, StructuralError};

/// All slides of a presentation
#[derive(Debug, Clone, Default)]
pub struct SlideCollection {
    /// Every slide in document order, `flat[i].no == i + 1`
    flat: Vec<Slide>,

    /// Positions of the top level slides in `flat`
    tree: Vec<usize>,
}

impl SlideCollection {
    /// Parse the top level `slides` list. A missing or empty list is an error.
    pub fn parse(
        raw: Option<&Value>,
        converter: &dyn MarkupConverter,
        title_max_length: usize,
    ) -> Result<Self> {
        let raw = match raw {
            Some(Value::Sequence(items)) if !items.is_empty() => items,
            Some(Value::Sequence(_)) | Some(Value::Null) | None => {
                return Err(StructuralError::SlidesMissing.into())
            }
            Some(other) => return Err(not_a_list(other).into()),
        };

        let mut collection = Self::default();
        collection.tree = collection.parse_level(raw, 1, converter, title_max_length)?;
        Ok(collection)
    }

    /// Parse one nesting level depth first. Parents are pushed before
    /// their children, so `flat` is in document order.
    fn parse_level(
        &mut self,
        items: &[Value],
        level: usize,
        converter: &dyn MarkupConverter,
        title_max_length: usize,
    ) -> Result<Vec<usize>> {
        let mut positions = Vec::with_capacity(items.len());

        for raw in items {
            let Some(parsed) = Slide::parse(raw, level, converter, title_max_length)? else {
                continue;
            };

            let position = self.flat.len();
            let mut slide = parsed.slide;
            slide.no = position + 1;
            self.flat.push(slide);

            let children = match parsed.children {
                Some(Value::Sequence(children)) => {
                    self.parse_level(&children, level + 1, converter, title_max_length)?
                }
                Some(other) => return Err(not_a_list(&other).into()),
                None => Vec::new(),
            };
            self.flat[position].children = children;
            positions.push(position);
        }

        Ok(positions)
    }

    /// Every slide in document order.
    pub fn flat(&self) -> &[Slide] {
        &self.flat
    }

    pub(crate) fn flat_mut(&mut self) -> &mut [Slide] {
        &mut self.flat
    }

    /// The top level slides.
    pub fn tree(&self) -> Vec<&Slide> {
        self.tree.iter().map(|&position| &self.flat[position]).collect()
    }

    /// The direct children of a slide.
    pub fn children(&self, slide: &Slide) -> Vec<&Slide> {
        slide
            .children
            .iter()
            .filter_map(|&position| self.flat.get(position))
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slide> {
        self.flat.iter()
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// Look up a slide by its number.
    pub fn get(&self, no: usize) -> Option<&Slide> {
        no.checked_sub(1).and_then(|index| self.flat.get(index))
    }

    /// Look up a slide by its `ref` meta key.
    pub fn with_ref(&self, reference: &str) -> Option<&Slide> {
        self.flat
            .iter()
            .find(|slide| slide.meta.reference.as_deref() == Some(reference))
    }

    fn node<'a>(&'a self, slide: &'a Slide) -> TreeNode<'a> {
        TreeNode {
            slide,
            slides: self
                .children(slide)
                .into_iter()
                .map(|child| self.node(child))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SlideCollection {
    type Item = &'a Slide;
    type IntoIter = std::slice::Iter<'a, Slide>;

    fn into_iter(self) -> Self::IntoIter {
        self.flat.iter()
    }
}

/// A slide with its children nested under `slides`
#[derive(Serialize)]
struct TreeNode<'a> {
    #[serde(flatten)]
    slide: &'a Slide,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    slides: Vec<TreeNode<'a>>,
}

/// Serialized as the tree view.
impl Serialize for SlideCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let tree = self.tree();
        let mut seq = serializer.serialize_seq(Some(tree.len()))?;
        for slide in tree {
            seq.serialize_element(&self.node(slide))?;
        }
        seq.end()
    }
}

fn not_a_list(raw: &Value) -> StructuralError {
    StructuralError::WrongType {
        context: "slide".to_string(),
        key: "slides".to_string(),
        expected: "list",
        raw: format_raw(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MarkdownConverter;
    use crate::error::Error;

    fn parse(yaml: &str) -> Result<SlideCollection> {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        SlideCollection::parse(Some(&raw), &MarkdownConverter::new(), 80)
    }

    #[test]
    fn test_flat_numbering_skips_absent_slides() {
        let slides = parse(
            "
- generic: One
- generic: Two
  state: absent
- generic: Three
  slides:
    - generic: Four
    - generic: Five
      state: absent
    - generic: Six
",
        )
        .unwrap();

        let titles: Vec<_> = slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Three", "Four", "Six"]);
        for (index, slide) in slides.iter().enumerate() {
            assert_eq!(slide.no, index + 1);
        }
        assert_eq!(slides.tree().len(), 2);
        assert_eq!(slides.children(slides.tree()[1]).len(), 2);
    }

    #[test]
    fn test_absent_subtree_is_dropped() {
        let slides = parse(
            "
- generic: One
- generic: Two
  state: absent
  slides:
    - generic: Hidden
",
        )
        .unwrap();
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_three_levels() {
        let slides = parse(
            "
- generic: A
  slides:
    - generic: B
      slides:
        - generic: C
",
        )
        .unwrap();
        let a = slides.tree()[0];
        let b = slides.children(a)[0];
        let c = slides.children(b)[0];
        assert_eq!((a.level, b.level, c.level), (1, 2, 3));
        assert_eq!((a.no, b.no, c.no), (1, 2, 3));
    }

    #[test]
    fn test_empty_slides() {
        for yaml in ["[]", "~"] {
            let err = parse(yaml).unwrap_err();
            assert!(matches!(
                err,
                Error::Structural(StructuralError::SlidesMissing)
            ));
        }
        let err = SlideCollection::parse(None, &MarkdownConverter::new(), 80).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::SlidesMissing)
        ));
    }

    #[test]
    fn test_lookup() {
        let slides = parse("[{ ref: a, generic: A }, { ref: b, generic: B }]").unwrap();
        assert_eq!(slides.with_ref("b").unwrap().no, 2);
        assert_eq!(slides.get(1).unwrap().title, "A");
        assert!(slides.get(0).is_none());
        assert!(slides.get(3).is_none());
    }

    #[test]
    fn test_serialized_as_tree() {
        let slides = parse("[{ generic: A, slides: [{ generic: B }] }]").unwrap();
        let json = serde_json::to_value(&slides).unwrap();
        assert_eq!(json[0]["master"], "generic");
        assert_eq!(json[0]["slides"][0]["no"], 2);
        assert_eq!(json[0]["slides"][0]["level"], 2);
    }
}
