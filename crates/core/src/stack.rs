//! The ordered image sequence published to playback.
//!
//! The pipeline never looks inside a [`StackImage`]; it only preserves the
//! order the retrieval collaborator returned. Any fields beyond the object
//! name and capture time are kept verbatim in [`StackImage::metadata`].

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// A single image reference within a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackImage {
    /// Storage key of the image, resolved by the playback surface.
    pub object_name: String,
    /// Capture time, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    /// Everything else the backend sent, untouched.
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl StackImage {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            time: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = Some(time);
        self
    }
}

/// Ordered sequence of images; order is the playback loop order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack(Vec<StackImage>);

impl Stack {
    pub fn new(images: Vec<StackImage>) -> Self {
        Self(images)
    }

    pub fn images(&self) -> &[StackImage] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StackImage> {
        self.0.iter()
    }

    /// Earliest and latest capture time across the stack.
    ///
    /// Images without a capture time are skipped; returns `None` when no
    /// image carries one. This is the actual date range covered, which can
    /// be narrower than the requested period.
    pub fn time_range(&self) -> Option<(Timestamp, Timestamp)> {
        let mut times = self.0.iter().filter_map(|image| image.time);
        let first = times.next()?;
        Some(times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

impl From<Vec<StackImage>> for Stack {
    fn from(images: Vec<StackImage>) -> Self {
        Self(images)
    }
}

impl FromIterator<StackImage> for Stack {
    fn from_iter<I: IntoIterator<Item = StackImage>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Stack {
    type Item = StackImage;
    type IntoIter = std::vec::IntoIter<StackImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a StackImage;
    type IntoIter = std::slice::Iter<'a, StackImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
