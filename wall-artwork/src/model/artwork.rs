use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Kind of media an artwork link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "img")]
    Image,
    #[serde(rename = "gif")]
    AnimatedImage,
    #[serde(rename = "mp4")]
    Video,
}

impl ContentType {
    /// Image and animated image bytes are fetched up front, video is streamed by the renderer.
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Image | Self::AnimatedImage)
    }
}

/// Pixel size of the artwork content, only used for its aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentSize {
    pub width: f32,
    pub height: f32,
}

impl ContentSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Size scaled so the longest side is 1.0.
    /// Degenerate sizes fall back to a unit square.
    pub fn unit(&self) -> Vec2 {
        if !self.is_valid() {
            return Vec2::ONE;
        }
        let longest = self.width.max(self.height);
        Vec2::new(self.width / longest, self.height / longest)
    }
}

/// Metadata identifying one piece of artwork.
///
/// Two descriptors are the same artwork iff their `content_link` matches;
/// every other field is display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkDescriptor {
    pub content_link: String,
    pub content_type: ContentType,
    pub content_size: ContentSize,
    pub artwork_name: String,
    pub artist_name: String,
    pub owner_name: String,
    pub external_link: String,
}

impl ArtworkDescriptor {
    pub fn new(content_link: impl Into<String>, content_type: ContentType, content_size: ContentSize) -> Self {
        Self {
            content_link: content_link.into(),
            content_type,
            content_size,
            artwork_name: String::new(),
            artist_name: String::new(),
            owner_name: String::new(),
            external_link: String::new(),
        }
    }

    pub fn with_names(
        mut self,
        artwork_name: impl Into<String>,
        artist_name: impl Into<String>,
        owner_name: impl Into<String>,
    ) -> Self {
        self.artwork_name = artwork_name.into();
        self.artist_name = artist_name.into();
        self.owner_name = owner_name.into();
        self
    }

    pub fn with_external_link(mut self, link: impl Into<String>) -> Self {
        self.external_link = link.into();
        self
    }

    /// Compact keyed encoding embedded in persisted anchors.
    pub fn to_keyed_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_keyed_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl PartialEq for ArtworkDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.content_link == other.content_link
    }
}

impl Eq for ArtworkDescriptor {}

impl Hash for ArtworkDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_link.hash(state);
    }
}
