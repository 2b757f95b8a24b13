//! Profile edits and social links.

use tracing::info;

use crate::auth::validate_username;
use crate::error::{HyperError, Result};
use crate::types::{LinkedYoutube, User};

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Update the editable profile fields. Blank bio/location clear the field.
pub fn update_profile(
    user: &mut User,
    username: &str,
    bio: Option<&str>,
    location: Option<&str>,
) -> Result<()> {
    let username = validate_username(username)?;
    user.username = username;
    user.bio = optional(bio);
    user.location = optional(location);
    info!(username = %user.username, "profile updated");
    Ok(())
}

pub fn link_youtube<'a>(
    user: &'a mut User,
    channel_id: &str,
    channel_name: &str,
    subscribers: u64,
) -> Result<&'a LinkedYoutube> {
    let channel_id = channel_id.trim();
    if channel_id.is_empty() {
        return Err(HyperError::MissingField("channel id"));
    }
    let channel_name = channel_name.trim();
    if channel_name.is_empty() {
        return Err(HyperError::MissingField("channel name"));
    }
    info!(channel_id, subscribers, "youtube channel linked");
    Ok(user.youtube.insert(LinkedYoutube {
        channel_id: channel_id.to_string(),
        channel_name: channel_name.to_string(),
        subscribers,
    }))
}

/// Returns the channel that was linked, if any.
pub fn unlink_youtube(user: &mut User) -> Option<LinkedYoutube> {
    user.youtube.take()
}

/// Record `n` new followers and return the new total.
pub fn follow_gained(user: &mut User, n: u64) -> u64 {
    user.followers = user.followers.saturating_add(n);
    user.followers
}
