use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CallStatus, CampaignView, ItemId};

/// Messages sent from spectator to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}

/// Messages pushed from server to spectators of a campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Sent once on connect
    Snapshot {
        campaign_code: String,
        started_at: Option<DateTime<Utc>>,
        items: Vec<ItemStatus>,
    },
    ItemCalled {
        item_id: ItemId,
        status: CallStatus,
    },
    CampaignStarted {
        started_at: DateTime<Utc>,
    },
    /// The campaign was deleted; the server closes the feed after this
    CampaignClosed,
    Pong,
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn snapshot(campaign: &CampaignView) -> Self {
        let items = campaign
            .categories
            .iter()
            .flat_map(|category| &category.items)
            .map(|item| ItemStatus {
                item_id: item.id,
                status: item.status,
            })
            .collect();

        ServerMessage::Snapshot {
            campaign_code: campaign.code.clone(),
            started_at: campaign.started_at,
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatus {
    pub item_id: ItemId,
    pub status: CallStatus,
}
