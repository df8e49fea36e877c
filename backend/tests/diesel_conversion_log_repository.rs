//! Integration tests for `DieselConversionLogRepository` against embedded
//! PostgreSQL: the dedup window under concurrent writers, and tallies.

use std::sync::Arc;

use chrono::{Duration, Utc};
use clinic_newsletter::domain::ports::{AppendOutcome, ConversionLogRepository};
use clinic_newsletter::domain::{
    CampaignId, ConversionEvent, ConversionLogEntry, ConversionTally, OrgId, TrackingId, UserId,
};
use clinic_newsletter::outbound::persistence::DieselConversionLogRepository;
use futures::future::join_all;
use rstest::{fixture, rstest};

mod support;

use support::{PgContext, pg_context};

const TEST_DB: &str = "diesel_conversion_log_repository_test";

struct LogContext {
    context: PgContext,
    repository: Arc<DieselConversionLogRepository>,
    org_id: OrgId,
}

#[fixture]
fn log_context() -> Option<LogContext> {
    let context = pg_context(TEST_DB, 8)?;
    let org_id = context.provision_org(&UserId::random());
    let repository = Arc::new(DieselConversionLogRepository::new(context.pool.clone()));
    Some(LogContext {
        context,
        repository,
        org_id,
    })
}

fn entry(org_id: &OrgId, tracking_id: &TrackingId, event: ConversionEvent) -> ConversionLogEntry {
    ConversionLogEntry {
        org_id: org_id.clone(),
        tracking_id: Some(tracking_id.clone()),
        campaign_id: Some(CampaignId::new(tracking_id.as_ref()).expect("valid campaign id")),
        event,
        recipient_ref: None,
        created_at: Utc::now(),
    }
}

fn row_count(context: &PgContext, org_id: &OrgId) -> i64 {
    context.count(
        "SELECT COUNT(*) FROM conversion_logs WHERE org_id = $1",
        &[&org_id.as_ref()],
    )
}

#[rstest]
#[case(2)]
#[case(12)]
fn racing_duplicates_inside_the_window_log_once(
    log_context: Option<LogContext>,
    #[case] writers: usize,
) {
    let Some(LogContext {
        context,
        repository,
        org_id,
    }) = log_context
    else {
        eprintln!("SKIP-TEST-CLUSTER: racing_duplicates_inside_the_window_log_once skipped");
        return;
    };
    let tracking_id = TrackingId::generate();
    let window_start = Utc::now() - Duration::seconds(60);

    let outcomes = context.runtime.block_on(async {
        let calls = (0..writers).map(|_| {
            let repository = repository.clone();
            let entry = entry(&org_id, &tracking_id, ConversionEvent::Click);
            tokio::spawn(async move { repository.append_unless_recent(&entry, window_start).await })
        });
        join_all(calls).await
    });

    let appended = outcomes
        .into_iter()
        .map(|joined| joined.expect("task completed").expect("append"))
        .filter(|outcome| *outcome == AppendOutcome::Appended)
        .count();
    assert_eq!(appended, 1);
    assert_eq!(row_count(&context, &org_id), 1);
}

#[rstest]
fn other_events_and_expired_windows_append_again(log_context: Option<LogContext>) {
    let Some(LogContext {
        context,
        repository,
        org_id,
    }) = log_context
    else {
        eprintln!("SKIP-TEST-CLUSTER: other_events_and_expired_windows_append_again skipped");
        return;
    };
    let tracking_id = TrackingId::generate();
    let click = entry(&org_id, &tracking_id, ConversionEvent::Click);
    let open = entry(&org_id, &tracking_id, ConversionEvent::Open);

    let outcomes = context.runtime.block_on(async {
        let window = click.created_at - Duration::seconds(60);
        let first = repository
            .append_unless_recent(&click, window)
            .await
            .expect("click");
        let open = repository
            .append_unless_recent(&open, window)
            .await
            .expect("open");
        let mut later = click.clone();
        later.created_at = click.created_at + Duration::seconds(61);
        let expired = repository
            .append_unless_recent(&later, later.created_at - Duration::seconds(60))
            .await
            .expect("later click");
        [first, open, expired]
    });

    assert_eq!(outcomes, [AppendOutcome::Appended; 3]);
    assert_eq!(row_count(&context, &org_id), 3);
}

#[rstest]
fn tally_counts_by_event_and_campaign(log_context: Option<LogContext>) {
    let Some(LogContext {
        context,
        repository,
        org_id,
    }) = log_context
    else {
        eprintln!("SKIP-TEST-CLUSTER: tally_counts_by_event_and_campaign skipped");
        return;
    };
    let first = TrackingId::generate();
    let second = TrackingId::generate();

    let (all, one_campaign) = context.runtime.block_on(async {
        for (tracking_id, event) in [
            (&first, ConversionEvent::Open),
            (&first, ConversionEvent::Click),
            (&second, ConversionEvent::Click),
        ] {
            repository
                .append(&entry(&org_id, tracking_id, event))
                .await
                .expect("append");
        }
        let all = repository.tally(&org_id, None).await.expect("tally");
        let campaign = CampaignId::new(first.as_ref()).expect("valid campaign id");
        let one = repository
            .tally(&org_id, Some(campaign))
            .await
            .expect("campaign tally");
        (all, one)
    });

    assert_eq!(
        all,
        ConversionTally {
            opens: 1,
            clicks: 2,
            total: 3
        }
    );
    assert_eq!(
        one_campaign,
        ConversionTally {
            opens: 1,
            clicks: 1,
            total: 2
        }
    );
}
