//! Control-plane messages from the hosting page.

use serde::{Deserialize, Serialize};

/// A message posted to the proxy over the host's notification channel.
///
/// The wire format is a tagged JSON object; the only kind currently defined
/// is `{"type": "SKIP_WAITING"}`, which asks a newly installed proxy to
/// begin governing requests immediately instead of waiting for existing
/// clients to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

// ============================================================================
// Tests
// ============================================================================
