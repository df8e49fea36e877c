//! In-memory implementations of every repository port.
//!
//! A single [`MemoryStore`] backs all ports so cross-table operations (a
//! campaign and its link, subscribers and their import log) stay atomic
//! under one lock. Used when no database is configured and by integration
//! tests.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::ports::{
    AppendOutcome, CampaignRepository, CampaignRepositoryError, ConversionLogRepository,
    ConversionLogRepositoryError, OrgConfigRepository, OrgConfigRepositoryError, OrgRepository,
    OrgRepositoryError, SubscriberRepository, SubscriberRepositoryError, TrackingLinkRepository,
    TrackingLinkRepositoryError,
};
use crate::domain::{
    CampaignId, ContentHash, ConversionEvent, ConversionLogEntry, ConversionTally, EmailAddress,
    ImportLog, NewsletterCampaign, OrgConfig, OrgId, Subscriber, TrackingId, TrackingLink, UserId,
};

#[derive(Default)]
struct MemoryState {
    user_orgs: HashMap<UserId, OrgId>,
    members: HashSet<(OrgId, UserId)>,
    subscribers: HashMap<OrgId, BTreeMap<EmailAddress, Subscriber>>,
    import_logs: HashMap<(OrgId, ContentHash), DateTime<Utc>>,
    campaigns: HashMap<OrgId, Vec<NewsletterCampaign>>,
    links: HashMap<TrackingId, TrackingLink>,
    conversions: Vec<ConversionLogEntry>,
    configs: HashMap<OrgId, OrgConfig>,
}

impl MemoryState {
    fn recently_logged(&self, entry: &ConversionLogEntry, window_start: DateTime<Utc>) -> bool {
        self.conversions.iter().any(|logged| {
            logged.tracking_id == entry.tracking_id
                && logged.event == entry.event
                && logged.created_at >= window_start
        })
    }
}

/// Process-local store implementing all repository ports.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversion rows; handy for assertions.
    pub async fn conversion_count(&self) -> usize {
        self.state.lock().await.conversions.len()
    }

    /// Number of user-to-org mappings.
    pub async fn mapping_count(&self) -> usize {
        self.state.lock().await.user_orgs.len()
    }

    pub async fn subscriber_count(&self, org_id: &OrgId) -> usize {
        self.state
            .lock()
            .await
            .subscribers
            .get(org_id)
            .map_or(0, BTreeMap::len)
    }

    /// Number of members recorded for `org_id`.
    pub async fn member_count(&self, org_id: &OrgId) -> usize {
        self.state
            .lock()
            .await
            .members
            .iter()
            .filter(|(org, _)| org == org_id)
            .count()
    }
}

#[async_trait]
impl OrgRepository for MemoryStore {
    async fn find_org_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<OrgId>, OrgRepositoryError> {
        Ok(self.state.lock().await.user_orgs.get(user_id).cloned())
    }

    async fn provision(
        &self,
        user_id: &UserId,
        candidate: &OrgId,
    ) -> Result<OrgId, OrgRepositoryError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.user_orgs.get(user_id) {
            return Ok(existing.clone());
        }
        state
            .members
            .insert((candidate.clone(), user_id.clone()));
        state.user_orgs.insert(user_id.clone(), candidate.clone());
        Ok(candidate.clone())
    }
}

#[async_trait]
impl SubscriberRepository for MemoryStore {
    async fn import_log_exists(
        &self,
        org_id: &OrgId,
        file_hash: &ContentHash,
    ) -> Result<bool, SubscriberRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .import_logs
            .contains_key(&(org_id.clone(), file_hash.clone())))
    }

    async fn existing_emails(
        &self,
        org_id: &OrgId,
        emails: &[EmailAddress],
    ) -> Result<HashSet<EmailAddress>, SubscriberRepositoryError> {
        let state = self.state.lock().await;
        let Some(stored) = state.subscribers.get(org_id) else {
            return Ok(HashSet::new());
        };
        Ok(emails
            .iter()
            .filter(|email| stored.contains_key(*email))
            .cloned()
            .collect())
    }

    async fn apply_import(
        &self,
        org_id: &OrgId,
        subscribers: &[Subscriber],
        log: Option<ImportLog>,
    ) -> Result<(), SubscriberRepositoryError> {
        let mut state = self.state.lock().await;
        let stored = state.subscribers.entry(org_id.clone()).or_default();
        for subscriber in subscribers {
            stored.insert(subscriber.email.clone(), subscriber.clone());
        }
        if let Some(log) = log {
            state
                .import_logs
                .entry((org_id.clone(), log.file_hash))
                .or_insert(log.first_imported_at);
        }
        Ok(())
    }

    async fn list_subscribers(
        &self,
        org_id: &OrgId,
    ) -> Result<Vec<Subscriber>, SubscriberRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .subscribers
            .get(org_id)
            .map(|stored| stored.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl TrackingLinkRepository for MemoryStore {
    async fn find(
        &self,
        id: &TrackingId,
    ) -> Result<Option<TrackingLink>, TrackingLinkRepositoryError> {
        Ok(self.state.lock().await.links.get(id).cloned())
    }

    async fn find_by_target(
        &self,
        org_id: &OrgId,
        campaign_id: &CampaignId,
        target_url: &str,
    ) -> Result<Option<TrackingLink>, TrackingLinkRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .links
            .values()
            .filter(|link| {
                &link.org_id == org_id
                    && &link.campaign_id == campaign_id
                    && link.target_url == target_url
            })
            .min_by_key(|link| link.created_at)
            .cloned())
    }

    async fn insert(&self, link: &TrackingLink) -> Result<(), TrackingLinkRepositoryError> {
        let mut state = self.state.lock().await;
        if state.links.contains_key(&link.id) {
            return Err(TrackingLinkRepositoryError::duplicate_id(
                link.id.to_string(),
            ));
        }
        state.links.insert(link.id.clone(), link.clone());
        Ok(())
    }
}

#[async_trait]
impl ConversionLogRepository for MemoryStore {
    async fn append_unless_recent(
        &self,
        entry: &ConversionLogEntry,
        window_start: DateTime<Utc>,
    ) -> Result<AppendOutcome, ConversionLogRepositoryError> {
        let mut state = self.state.lock().await;
        if entry.tracking_id.is_some() && state.recently_logged(entry, window_start) {
            return Ok(AppendOutcome::AlreadyLogged);
        }
        state.conversions.push(entry.clone());
        Ok(AppendOutcome::Appended)
    }

    async fn append(&self, entry: &ConversionLogEntry) -> Result<(), ConversionLogRepositoryError> {
        self.state.lock().await.conversions.push(entry.clone());
        Ok(())
    }

    async fn tally(
        &self,
        org_id: &OrgId,
        campaign_id: Option<CampaignId>,
    ) -> Result<ConversionTally, ConversionLogRepositoryError> {
        let state = self.state.lock().await;
        let mut tally = ConversionTally::default();
        let scoped = state.conversions.iter().filter(|entry| {
            &entry.org_id == org_id
                && campaign_id
                    .as_ref()
                    .is_none_or(|wanted| entry.campaign_id.as_ref() == Some(wanted))
        });
        for entry in scoped {
            tally.total += 1;
            match entry.event {
                ConversionEvent::Open => tally.opens += 1,
                ConversionEvent::Click => tally.clicks += 1,
            }
        }
        Ok(tally)
    }
}

#[async_trait]
impl CampaignRepository for MemoryStore {
    async fn create_with_link(
        &self,
        campaign: &NewsletterCampaign,
        link: &TrackingLink,
    ) -> Result<(), CampaignRepositoryError> {
        let mut state = self.state.lock().await;
        if state.links.contains_key(&link.id) {
            return Err(CampaignRepositoryError::query(format!(
                "tracking link already exists: {}",
                link.id
            )));
        }
        state.links.insert(link.id.clone(), link.clone());
        state
            .campaigns
            .entry(campaign.org_id.clone())
            .or_default()
            .push(campaign.clone());
        Ok(())
    }

    async fn find(
        &self,
        org_id: &OrgId,
        id: &CampaignId,
    ) -> Result<Option<NewsletterCampaign>, CampaignRepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .campaigns
            .get(org_id)
            .and_then(|campaigns| campaigns.iter().find(|campaign| &campaign.id == id))
            .cloned())
    }

    async fn update(
        &self,
        campaign: &NewsletterCampaign,
        retarget_link: bool,
    ) -> Result<(), CampaignRepositoryError> {
        let mut state = self.state.lock().await;
        if let Some(stored) = state
            .campaigns
            .get_mut(&campaign.org_id)
            .and_then(|campaigns| campaigns.iter_mut().find(|stored| stored.id == campaign.id))
        {
            *stored = campaign.clone();
        }
        if retarget_link {
            let link_id = TrackingId::from(campaign.id.clone());
            if let Some(link) = state
                .links
                .get_mut(&link_id)
                .filter(|link| link.org_id == campaign.org_id)
            {
                link.target_url.clone_from(&campaign.cta_url);
                link.updated_at = Some(campaign.updated_at);
            }
        }
        Ok(())
    }

    async fn list(
        &self,
        org_id: &OrgId,
    ) -> Result<Vec<NewsletterCampaign>, CampaignRepositoryError> {
        let state = self.state.lock().await;
        let mut campaigns = state.campaigns.get(org_id).cloned().unwrap_or_default();
        campaigns.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(campaigns)
    }

    async fn count(&self, org_id: &OrgId) -> Result<u64, CampaignRepositoryError> {
        let state = self.state.lock().await;
        let count = state.campaigns.get(org_id).map_or(0, Vec::len);
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl OrgConfigRepository for MemoryStore {
    async fn find(&self, org_id: &OrgId) -> Result<Option<OrgConfig>, OrgConfigRepositoryError> {
        Ok(self.state.lock().await.configs.get(org_id).cloned())
    }

    async fn save(
        &self,
        org_id: &OrgId,
        config: &OrgConfig,
        _at: DateTime<Utc>,
    ) -> Result<(), OrgConfigRepositoryError> {
        self.state
            .lock()
            .await
            .configs
            .insert(org_id.clone(), config.clone());
        Ok(())
    }
}
