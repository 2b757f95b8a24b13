use crate::error::{HyperError, Result};

const EMBED_BASE: &str = "https://www.youtube.com/embed";
const VIDEO_ID_LEN: usize = 11;

/// Permissions granted to the embedded player iframe.
pub const PLAYER_PERMISSIONS: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";

pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Autoplaying, minimally branded player URL for `video_id`.
pub fn youtube_embed_url(video_id: &str) -> Result<String> {
    let video_id = video_id.trim();
    if !is_valid_video_id(video_id) {
        return Err(HyperError::Validation(format!(
            "invalid video id: {video_id:?}"
        )));
    }
    Ok(format!(
        "{EMBED_BASE}/{video_id}?autoplay=1&modestbranding=1&rel=0"
    ))
}
