use serde::Serialize;

use crate::modules::file::schema::FileEntity;

/// Strongest permission a requester holds on a file. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectivePermission {
    Owner,
    FriendGrant,
    PublicGrant,
    Denied,
}

impl EffectivePermission {
    pub fn is_denied(self) -> bool {
        self == EffectivePermission::Denied
    }

    pub fn can_edit(self) -> bool {
        self == EffectivePermission::Owner
    }
}

/// A file together with the strongest permission the requester holds on it.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub file: FileEntity,
    pub permission: EffectivePermission,
}
