//! Tracking-link resolution and conversion recording.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AppendOutcome, ConversionLogRepository, ConversionTracking, EnsureTrackingLinksRequest,
    OrgRepository, TrackingLinkRepository, TrackingLinkRepositoryError,
};
use crate::domain::{
    ConversionEvent, ConversionLogEntry, ConversionTarget, Error, IdempotencyConfig, LegacyClick,
    TenantGuard, TrackingId, TrackingLink,
};

/// Attempts at finding an unused id before giving up on a new link.
const LINK_ID_ATTEMPTS: usize = 3;

/// Service implementing [`ConversionTracking`].
pub struct ConversionTrackingService<L, C, O> {
    links: Arc<L>,
    logs: Arc<C>,
    tenants: TenantGuard<O>,
    clock: Arc<dyn Clock>,
    config: IdempotencyConfig,
}

impl<L, C, O> ConversionTrackingService<L, C, O> {
    /// Create a service with the default dedup window.
    pub fn new(links: Arc<L>, logs: Arc<C>, orgs: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            links,
            logs,
            tenants: TenantGuard::new(orgs),
            clock,
            config: IdempotencyConfig::default(),
        }
    }

    /// Override the dedup window.
    #[must_use]
    pub fn with_config(mut self, config: IdempotencyConfig) -> Self {
        self.config = config;
        self
    }

    fn window_start(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
        let window = TimeDelta::from_std(self.config.dedup_window())
            .map_err(|err| Error::internal(format!("dedup window out of range: {err}")))?;
        Ok(now - window)
    }
}

impl<L, C, O> ConversionTrackingService<L, C, O>
where
    L: TrackingLinkRepository,
{
    async fn insert_fresh_link(
        &self,
        request: &EnsureTrackingLinksRequest,
        target_url: &str,
    ) -> Result<TrackingId, Error> {
        let now = self.clock.utc();
        let mut last_error = None;
        for _ in 0..LINK_ID_ATTEMPTS {
            let link = TrackingLink::new(
                TrackingId::generate(),
                request.org_id.clone(),
                request.campaign_id.clone(),
                target_url,
                now,
            );
            match self.links.insert(&link).await {
                Ok(()) => return Ok(link.id),
                Err(err @ TrackingLinkRepositoryError::DuplicateId { .. }) => {
                    debug!(error = %err, "tracking id collision; regenerating");
                    last_error = Some(err);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(last_error.map_or_else(
            || Error::internal("could not allocate a tracking id"),
            Error::from,
        ))
    }
}

#[async_trait]
impl<L, C, O> ConversionTracking for ConversionTrackingService<L, C, O>
where
    L: TrackingLinkRepository,
    C: ConversionLogRepository,
    O: OrgRepository,
{
    async fn record_conversion(
        &self,
        tracking_id: &TrackingId,
        event: ConversionEvent,
    ) -> Result<ConversionTarget, Error> {
        let Some(link) = self.links.find(tracking_id).await? else {
            debug!(tracking_id = %tracking_id, "unknown tracking id");
            return Err(Error::not_found(format!(
                "tracking link {tracking_id} not found"
            )));
        };

        let now = self.clock.utc();
        let entry = ConversionLogEntry::for_link(&link, event, now);
        let outcome = self
            .logs
            .append_unless_recent(&entry, self.window_start(now)?)
            .await?;
        let already_logged = outcome == AppendOutcome::AlreadyLogged;
        info!(
            tracking_id = %tracking_id,
            org_id = %link.org_id,
            event = %event,
            already_logged,
            "recorded conversion"
        );

        Ok(ConversionTarget {
            target_url: link.resolved_target(),
            already_logged,
        })
    }

    async fn record_legacy_click(&self, click: LegacyClick) -> Result<(), Error> {
        let LegacyClick {
            org_id,
            campaign_id,
            recipient_ref,
            target,
        } = click;
        warn!(org_id = %org_id, target = %target, "deprecated redirect endpoint used");
        let entry = ConversionLogEntry {
            org_id,
            tracking_id: None,
            campaign_id,
            event: ConversionEvent::Click,
            recipient_ref,
            created_at: self.clock.utc(),
        };
        self.logs.append(&entry).await?;
        Ok(())
    }

    async fn ensure_tracking_links(
        &self,
        request: EnsureTrackingLinksRequest,
    ) -> Result<BTreeMap<String, TrackingId>, Error> {
        self.tenants
            .authorize(&request.caller, &request.org_id)
            .await?;

        let mut mapping = BTreeMap::new();
        for url in &request.urls {
            let target_url = url.trim();
            if target_url.is_empty() || mapping.contains_key(target_url) {
                continue;
            }
            let existing = self
                .links
                .find_by_target(&request.org_id, &request.campaign_id, target_url)
                .await?;
            let id = match existing {
                Some(link) => link.id,
                None => self.insert_fresh_link(&request, target_url).await?,
            };
            mapping.insert(target_url.to_owned(), id);
        }
        debug!(
            org_id = %request.org_id,
            campaign_id = %request.campaign_id,
            links = mapping.len(),
            "ensured tracking links"
        );
        Ok(mapping)
    }
}

#[cfg(test)]
#[path = "conversion_tracking_service_tests.rs"]
mod tests;
