//! Avatar upload validation.

use thiserror::Error;

/// Default upload cap: 2 MiB.
pub const DEFAULT_MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// Errors raised when an uploaded file cannot become an avatar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvatarValidationError {
    /// The multipart field `img` was missing.
    #[error("no image was uploaded")]
    Missing,
    /// The upload carried no bytes.
    #[error("uploaded image is empty")]
    Empty,
    /// Only PNG and JPEG images are accepted.
    #[error("unsupported image type: {content_type}")]
    UnsupportedType {
        /// Content type reported by the client.
        content_type: String,
    },
    /// The upload exceeded the configured cap.
    #[error("uploaded image exceeds {max} bytes")]
    TooLarge {
        /// Maximum permitted size in bytes.
        max: usize,
    },
}

/// Accepted avatar image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
}

impl ImageKind {
    /// Map a client-supplied content type to an accepted format.
    ///
    /// # Examples
    /// ```
    /// use microblog::domain::ImageKind;
    ///
    /// assert_eq!(ImageKind::from_content_type("image/png").ok(), Some(ImageKind::Png));
    /// assert!(ImageKind::from_content_type("image/gif").is_err());
    /// ```
    pub fn from_content_type(content_type: &str) -> Result<Self, AvatarValidationError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            _ => Err(AvatarValidationError::UnsupportedType {
                content_type: content_type.to_owned(),
            }),
        }
    }

    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => ".png",
            Self::Jpeg => ".jpg",
        }
    }
}

/// Validated avatar upload ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    kind: ImageKind,
    bytes: Vec<u8>,
}

impl AvatarUpload {
    /// Validate uploaded bytes against the format and size rules.
    pub fn new(
        content_type: &str,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, AvatarValidationError> {
        let kind = ImageKind::from_content_type(content_type)?;
        if bytes.is_empty() {
            return Err(AvatarValidationError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(AvatarValidationError::TooLarge { max: max_bytes });
        }
        Ok(Self { kind, bytes })
    }

    /// Image format.
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
