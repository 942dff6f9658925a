//! Everything related to users.
//!
//! [PublicUser] is the user object embedded in other objects, such as a playlist's owner. [PrivateUser] is the
//! current user's profile returned from `me`; its private fields are only present when the access token has the
//! `user-read-private` and `user-read-email` scopes.

use super::{ExternalUrls, Followers, Image};
use serde::{Deserialize, Serialize};

/// Public information about a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub uri: Option<String>,
}

/// The current user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateUser {
    #[serde(flatten)]
    pub public: PublicUser,
    pub country: Option<String>,
    pub email: Option<String>,
    pub product: Option<String>,
    pub explicit_content: Option<ExplicitContent>,
}

/// Information about a user's explicit content settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitContent {
    /// When `true`, indicates that explicit content should not be played.
    pub filter_enabled: bool,
    /// When `true`, indicates that the explicit content setting is locked and can't be changed by the user.
    pub filter_locked: bool,
}

impl PartialEq for PublicUser {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PublicUser {}

impl PartialEq for PrivateUser {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public
    }
}

impl Eq for PrivateUser {}

impl PrivateUser {
    pub fn id(&self) -> &str {
        &self.public.id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.public.display_name.as_deref()
    }
}
