use serde::{Deserialize, Serialize};

/// A known member of a room, mapping a user identifier to the name the
/// renderer should display for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomMember {
    /// Identifier of the user, e.g. `@alice:example.org`.
    pub user_id: String,

    /// Human-readable display name, when the server has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl RoomMember {
    /// The name to show for this member: the display name when known,
    /// the raw user id otherwise.
    #[must_use]
    pub fn visible_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}
