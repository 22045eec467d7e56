use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One image referenced by a tag (a multi-arch tag references several)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
}

impl Image {
    /// Create an image descriptor with only a digest
    pub fn new(digest: impl Into<String>) -> Self {
        Image {
            digest: digest.into(),
            architecture: None,
            os: None,
        }
    }

    /// Attach the platform this image was built for
    pub fn with_platform(mut self, os: impl Into<String>, architecture: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self.architecture = Some(architecture.into());
        self
    }
}

/// Represents a tag in a registry repository, as reported by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,

    #[serde(
        rename = "tag_last_pushed",
        alias = "last_pushed",
        alias = "lastPushed"
    )]
    pub last_pushed: DateTime<Utc>,

    /// `None` when the registry has never served this tag
    #[serde(
        default,
        rename = "tag_last_pulled",
        alias = "last_pulled",
        alias = "lastPulled"
    )]
    pub last_pulled: Option<DateTime<Utc>>,

    #[serde(default)]
    pub images: Vec<Image>,
}

impl Tag {
    /// Create a new tag
    pub fn new(
        name: impl Into<String>,
        last_pushed: DateTime<Utc>,
        last_pulled: Option<DateTime<Utc>>,
    ) -> Self {
        Tag {
            name: name.into(),
            last_pushed,
            last_pulled,
            images: Vec::new(),
        }
    }

    /// Add an image to this tag
    pub fn with_image(mut self, image: Image) -> Self {
        self.images.push(image);
        self
    }

    /// Iterate over the digests of every image this tag references
    pub fn digests(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|image| image.digest.as_str())
    }

    /// Whether both the last push and the last pull happened strictly before `cutoff`.
    ///
    /// A tag that was never pulled counts as pulled before any cutoff.
    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_pushed < cutoff && self.last_pulled.map_or(true, |pulled| pulled < cutoff)
    }
}
