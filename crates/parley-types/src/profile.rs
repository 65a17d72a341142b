use uuid::Uuid;

/// Narrow view of a user identity, as much as the chat core ever needs to
/// know about one. The embedding application implements this for its own
/// user type; the core never defines or stores users itself.
pub trait Profile {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn email(&self) -> &str;
    /// Stored avatar file name, or the configured default when unset.
    fn avatar_name(&self) -> &str;
}
