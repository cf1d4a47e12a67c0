//! Campaign entity, its editable draft, and the payload handed to persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Channel, FieldRef, RecordId};

/// Campaign as stored by the backing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: RecordId,
    pub name: String,
    /// Target audience lists.
    #[serde(default)]
    pub lists: Vec<RecordId>,
    /// Audience lists whose members are excluded from delivery.
    #[serde(default)]
    pub exclusion_lists: Vec<RecordId>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub channel: Channel,
    #[serde(default)]
    pub provider_id: Option<RecordId>,
    #[serde(default)]
    pub subscription_id: Option<RecordId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Editable form value for a campaign.
///
/// Created empty for a new campaign or seeded from an existing one when
/// editing. Selections are stored as identifiers so they survive catalog
/// refreshes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub name: String,
    pub lists: Vec<RecordId>,
    pub exclusion_lists: Vec<RecordId>,
    pub tags: Vec<String>,
    pub channel: Option<Channel>,
    pub provider_id: Option<RecordId>,
    pub subscription_id: Option<RecordId>,
}

macro_rules! draft_field {
    ($constant:ident, $field:ident: $ty:ty) => {
        pub const $constant: FieldRef<CampaignDraft, $ty> = {
            fn get(draft: &CampaignDraft) -> &$ty {
                &draft.$field
            }
            fn set(draft: &mut CampaignDraft, value: $ty) {
                draft.$field = value;
            }
            FieldRef::new(stringify!($field), get, set)
        };
    };
}

impl CampaignDraft {
    draft_field!(NAME, name: String);
    draft_field!(LISTS, lists: Vec<RecordId>);
    draft_field!(EXCLUSION_LISTS, exclusion_lists: Vec<RecordId>);
    draft_field!(TAGS, tags: Vec<String>);
    draft_field!(CHANNEL, channel: Option<Channel>);
    draft_field!(PROVIDER_ID, provider_id: Option<RecordId>);
    draft_field!(SUBSCRIPTION_ID, subscription_id: Option<RecordId>);

    pub fn from_campaign(campaign: &Campaign) -> Self {
        Self {
            name: campaign.name.clone(),
            lists: campaign.lists.clone(),
            exclusion_lists: campaign.exclusion_lists.clone(),
            tags: campaign.tags.clone(),
            channel: Some(campaign.channel),
            provider_id: campaign.provider_id,
            subscription_id: campaign.subscription_id,
        }
    }

    pub fn to_payload(&self) -> CampaignPayload {
        CampaignPayload {
            name: self.name.trim().to_string(),
            lists: self.lists.clone(),
            exclusion_lists: self.exclusion_lists.clone(),
            tags: self.tags.clone(),
            channel: self.channel,
            provider_id: self.provider_id,
            subscription_id: self.subscription_id,
        }
    }
}

/// Body sent to `create`/`update`. Identifiers are submitted as-is, including
/// ones that no longer resolve against a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPayload {
    pub name: String,
    pub lists: Vec<RecordId>,
    pub exclusion_lists: Vec<RecordId>,
    pub tags: Vec<String>,
    pub channel: Option<Channel>,
    pub provider_id: Option<RecordId>,
    pub subscription_id: Option<RecordId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign() -> Campaign {
        Campaign {
            id: RecordId(7),
            name: "  Launch ".into(),
            lists: vec![RecordId(1), RecordId(3)],
            exclusion_lists: vec![RecordId(2)],
            tags: vec!["q3".into()],
            channel: Channel::Email,
            provider_id: Some(RecordId(5)),
            subscription_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn draft_seeds_from_existing_campaign() {
        let draft = CampaignDraft::from_campaign(&campaign());
        assert_eq!(draft.channel, Some(Channel::Email));
        assert_eq!(CampaignDraft::LISTS.get(&draft), &vec![RecordId(1), RecordId(3)]);
        assert_eq!(CampaignDraft::PROVIDER_ID.name(), "provider_id");
    }

    #[test]
    fn payload_trims_name_and_keeps_raw_identifiers() {
        let payload = CampaignDraft::from_campaign(&campaign()).to_payload();
        assert_eq!(payload.name, "Launch");
        assert_eq!(payload.lists, vec![RecordId(1), RecordId(3)]);
        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(json["channel"], "email");
        assert_eq!(json["lists"], serde_json::json!([1, 3]));
    }
}
