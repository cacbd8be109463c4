use consumer_api::StorageKey;

/// Metadata entry that routes a message to the persistence path.
pub const PLAYER_ID_METADATA_KEY: &str = "PlayerId";

/// Key prefix for `PlayerJoinedEvent` records.
pub const PLAYER_JOINED_KEY_PREFIX: &str = "player_joined_event_";

/// `player_joined_event_<player_id>`.
///
/// `player_id` comes from request metadata, not from the payload.
pub fn player_joined_key(player_id: &str) -> StorageKey {
    StorageKey::new(PLAYER_JOINED_KEY_PREFIX, player_id)
}
