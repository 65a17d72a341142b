/// Static configuration for the chat core. Read-only at runtime; the
/// embedding application builds one of these at startup and hands it to the
/// messenger.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Extensions classified as images when attached to a message.
    pub allowed_images: Vec<String>,
    /// Extensions accepted for non-image file attachments.
    pub allowed_files: Vec<String>,
    /// Maximum attachment upload size, in megabytes.
    pub max_upload_size_mb: u64,
    /// Blob-storage folder holding message attachments.
    pub attachments_folder: String,
    /// Blob-storage folder holding user avatars.
    pub avatars_folder: String,
    /// Avatar file name meaning "no custom avatar set".
    pub default_avatar: String,
    pub gravatar: GravatarConfig,
    /// UI color palette. The first entry doubles as the fallback color.
    pub colors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GravatarConfig {
    pub enabled: bool,
    pub image_size: u32,
    /// Gravatar `d=` parameter used when the email has no gravatar.
    pub imageset: String,
}

impl ChatConfig {
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1_048_576
    }

    pub fn fallback_color(&self) -> &str {
        self.colors.first().map(String::as_str).unwrap_or("#000000")
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            allowed_images: ["png", "jpg", "jpeg", "gif"]
                .map(String::from)
                .to_vec(),
            allowed_files: ["zip", "rar", "txt", "png", "jpg", "jpeg", "gif"]
                .map(String::from)
                .to_vec(),
            max_upload_size_mb: 150,
            attachments_folder: "attachments".into(),
            avatars_folder: "users-avatar".into(),
            default_avatar: "avatar.png".into(),
            gravatar: GravatarConfig {
                enabled: true,
                image_size: 200,
                imageset: "mm".into(),
            },
            colors: [
                "#2180f3", "#2196F3", "#00BCD4", "#3F51B5", "#673AB7",
                "#4CAF50", "#FFC107", "#FF9800", "#ff2522", "#9C27B0",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_cap_is_in_bytes() {
        let config = ChatConfig {
            max_upload_size_mb: 2,
            ..ChatConfig::default()
        };
        assert_eq!(config.max_upload_size_bytes(), 2 * 1_048_576);
    }

    #[test]
    fn fallback_color_survives_an_empty_palette() {
        let mut config = ChatConfig::default();
        assert_eq!(config.fallback_color(), "#2180f3");

        config.colors.clear();
        assert_eq!(config.fallback_color(), "#000000");
    }
}
