use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::properties::Properties;

/// Discriminates which payload fields of an [`Envelope`] are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// An identify call: `traits` is populated.
    Identify,
    /// A track call: `event` and `properties` are populated.
    Track,
}

/// One canonical, fully-stamped event record queued for delivery.
///
/// Envelopes are created by [`Envelope::track`] and [`Envelope::identify`],
/// which guarantee that exactly one of (`event` + `properties`) or `traits`
/// is populated, matching `kind`. Field names follow the collector wire
/// format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Stable per-installation identifier. Never empty.
    pub anonymous_id: String,
    /// Set once `identify` has been called. Persists across restarts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Globally unique per envelope. A retried batch resends identical
    /// message ids, never new ones.
    pub message_id: String,
    /// Which payload fields are populated.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Static metadata snapshot, shared by every envelope of the client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Arc<Properties>>,
    /// Capture time, ISO-8601. Set once at creation, immutable thereafter.
    pub original_timestamp: String,
    /// Event name. Track only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Event properties. Track only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    /// User traits. Identify only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traits: Option<Properties>,
}

impl Envelope {
    /// Stamp a track call into an envelope using the current identity and
    /// context snapshot.
    pub fn track(
        identity: Identity,
        context: Option<Arc<Properties>>,
        event_name: impl Into<String>,
        properties: Properties,
    ) -> Envelope {
        Envelope {
            event: Some(event_name.into()),
            properties: Some(properties),
            traits: None,
            ..Envelope::stamp(identity, context, EventKind::Track)
        }
    }

    /// Stamp an identify call into an envelope using the current identity and
    /// context snapshot. The identity is expected to already carry the new
    /// user id.
    pub fn identify(
        identity: Identity,
        context: Option<Arc<Properties>>,
        traits: Properties,
    ) -> Envelope {
        Envelope {
            traits: Some(traits),
            ..Envelope::stamp(identity, context, EventKind::Identify)
        }
    }

    fn stamp(identity: Identity, context: Option<Arc<Properties>>, kind: EventKind) -> Envelope {
        Envelope {
            anonymous_id: identity.anonymous_id,
            user_id: identity.user_id,
            message_id: uuid::Uuid::new_v4().to_string(),
            kind,
            context,
            original_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event: None,
            properties: None,
            traits: None,
        }
    }
}
