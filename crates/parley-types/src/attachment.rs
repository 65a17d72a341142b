use serde::{Deserialize, Serialize};

/// Reference to a file stored alongside a message.
///
/// This is the one structured format persisted inline in a message row's
/// `attachment` column, as JSON `{"new_name": ..., "old_name": ...}`.
/// `new_name` is the system-generated stored file name; `old_name` is the
/// user-supplied original name, kept for display only and escaped before
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub new_name: String,
    pub old_name: String,
}

/// Derived classification of an attachment by its stored file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    File,
}

impl AttachmentRef {
    pub fn new(new_name: impl Into<String>, old_name: impl Into<String>) -> Self {
        Self {
            new_name: new_name.into(),
            old_name: old_name.into(),
        }
    }

    /// Extension of the stored file name, if it has one.
    pub fn extension(&self) -> Option<&str> {
        std::path::Path::new(&self.new_name)
            .extension()
            .and_then(|ext| ext.to_str())
    }

    /// `Image` when the stored extension is in the image allowlist,
    /// `File` otherwise (including extensionless names).
    pub fn kind(&self, allowed_images: &[String]) -> AttachmentKind {
        match self.extension() {
            Some(ext) if allowed_images.iter().any(|allowed| allowed == ext) => {
                AttachmentKind::Image
            }
            _ => AttachmentKind::File,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images() -> Vec<String> {
        vec!["png".into(), "jpg".into(), "jpeg".into(), "gif".into()]
    }

    #[test]
    fn classifies_image_extensions() {
        let att = AttachmentRef::new("abc123.png", "holiday.png");
        assert_eq!(att.kind(&images()), AttachmentKind::Image);
    }

    #[test]
    fn classifies_everything_else_as_file() {
        let att = AttachmentRef::new("abc123.pdf", "report.pdf");
        assert_eq!(att.kind(&images()), AttachmentKind::File);

        let bare = AttachmentRef::new("noextension", "noextension");
        assert_eq!(bare.kind(&images()), AttachmentKind::File);
    }

    #[test]
    fn wire_format_round_trips() {
        let att = AttachmentRef::new("abc123.png", "My Pic.png");
        let json = serde_json::to_string(&att).unwrap();
        assert!(json.contains("\"new_name\""));
        assert!(json.contains("\"old_name\""));

        let back: AttachmentRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, att);
    }
}
