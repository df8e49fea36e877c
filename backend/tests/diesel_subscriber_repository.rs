//! Integration tests for `DieselSubscriberRepository` against embedded
//! PostgreSQL: merge-by-email upserts, the import log written in the same
//! transaction, and net-new counting through the import service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use clinic_newsletter::domain::ports::{
    ImportSubscribersRequest, SubscriberImport, SubscriberRepository,
};
use clinic_newsletter::domain::{
    ContentHash, EmailAddress, ImportLog, OrgId, Subscriber, SubscriberImportService, UserId,
};
use clinic_newsletter::outbound::persistence::{DieselOrgRepository, DieselSubscriberRepository};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

mod support;

use support::{PgContext, pg_context};

const TEST_DB: &str = "diesel_subscriber_repository_test";

struct SubscriberContext {
    context: PgContext,
    repository: DieselSubscriberRepository,
    owner: UserId,
    org_id: OrgId,
}

#[fixture]
fn subscriber_context() -> Option<SubscriberContext> {
    let context = pg_context(TEST_DB, 4)?;
    let owner = UserId::random();
    let org_id = context.provision_org(&owner);
    let repository = DieselSubscriberRepository::new(context.pool.clone());
    Some(SubscriberContext {
        context,
        repository,
        owner,
        org_id,
    })
}

fn email(raw: &str) -> EmailAddress {
    EmailAddress::parse(raw).expect("valid email")
}

fn log_for(text: &str, at: chrono::DateTime<Utc>) -> ImportLog {
    ImportLog {
        file_hash: ContentHash::of_text(text),
        first_imported_at: at,
    }
}

#[rstest]
fn upserts_merge_by_email_and_record_the_log(subscriber_context: Option<SubscriberContext>) {
    let Some(SubscriberContext {
        context,
        repository,
        org_id,
        ..
    }) = subscriber_context
    else {
        eprintln!("SKIP-TEST-CLUSTER: upserts_merge_by_email_and_record_the_log skipped");
        return;
    };
    let first_at = Utc::now() - Duration::minutes(5);
    let second_at = Utc::now();

    let (stored, first_logged, unknown_logged, existing) = context.runtime.block_on(async {
        repository
            .apply_import(
                &org_id,
                &[
                    Subscriber::imported(email("a@clinic.example"), first_at),
                    Subscriber::imported(email("b@clinic.example"), first_at),
                ],
                Some(log_for("file-a", first_at)),
            )
            .await
            .expect("first import");
        repository
            .apply_import(
                &org_id,
                &[
                    Subscriber::imported(email("b@clinic.example"), second_at),
                    Subscriber::imported(email("c@clinic.example"), second_at),
                ],
                Some(log_for("file-b", second_at)),
            )
            .await
            .expect("second import");

        let stored = repository.list_subscribers(&org_id).await.expect("list");
        let first_logged = repository
            .import_log_exists(&org_id, &ContentHash::of_text("file-a"))
            .await
            .expect("log lookup");
        let unknown_logged = repository
            .import_log_exists(&org_id, &ContentHash::of_text("never-seen"))
            .await
            .expect("log lookup");
        let existing = repository
            .existing_emails(
                &org_id,
                &[email("a@clinic.example"), email("z@clinic.example")],
            )
            .await
            .expect("existing emails");
        (stored, first_logged, unknown_logged, existing)
    });

    let emails: Vec<&str> = stored.iter().map(|row| row.email.as_ref()).collect();
    assert_eq!(
        emails,
        ["a@clinic.example", "b@clinic.example", "c@clinic.example"]
    );
    let merged = stored
        .iter()
        .find(|row| row.email.as_ref() == "b@clinic.example")
        .expect("b stored");
    assert!(merged.updated_at > first_at);
    assert!(first_logged);
    assert!(!unknown_logged);
    assert_eq!(existing.len(), 1);
    assert!(existing.contains(&email("a@clinic.example")));
    assert_eq!(
        context.count(
            "SELECT COUNT(*) FROM import_logs WHERE org_id = $1",
            &[&org_id.as_ref()]
        ),
        2
    );
}

#[rstest]
fn repeated_log_entries_are_kept_once(subscriber_context: Option<SubscriberContext>) {
    let Some(SubscriberContext {
        context,
        repository,
        org_id,
        ..
    }) = subscriber_context
    else {
        eprintln!("SKIP-TEST-CLUSTER: repeated_log_entries_are_kept_once skipped");
        return;
    };
    let at = Utc::now();

    context.runtime.block_on(async {
        for _ in 0..2 {
            repository
                .apply_import(
                    &org_id,
                    &[Subscriber::imported(email("a@clinic.example"), at)],
                    Some(log_for("same-file", at)),
                )
                .await
                .expect("import");
        }
    });

    let org = org_id.as_ref();
    assert_eq!(
        context.count(
            "SELECT COUNT(*) FROM import_logs WHERE org_id = $1",
            &[&org]
        ),
        1
    );
    assert_eq!(
        context.count(
            "SELECT COUNT(*) FROM subscribers WHERE org_id = $1",
            &[&org]
        ),
        1
    );
}

#[rstest]
fn import_service_counts_net_new_rows(subscriber_context: Option<SubscriberContext>) {
    let Some(SubscriberContext {
        context,
        repository,
        owner,
        org_id,
    }) = subscriber_context
    else {
        eprintln!("SKIP-TEST-CLUSTER: import_service_counts_net_new_rows skipped");
        return;
    };
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let service = SubscriberImportService::new(
        Arc::new(repository),
        Arc::new(DieselOrgRepository::new(context.pool.clone())),
        clock,
    );
    let file_a = "a@clinic.example\nb@clinic.example\n";
    let file_b = "a@clinic.example\nb@clinic.example\nc@clinic.example\n";
    let request = |csv_text: &str| ImportSubscribersRequest {
        caller: owner.clone(),
        org_id: org_id.clone(),
        csv_text: csv_text.to_owned(),
        file_hash: ContentHash::of_text(csv_text),
    };

    let counts = context.runtime.block_on(async {
        let mut counts = Vec::new();
        for text in [file_a, file_b, file_b] {
            let outcome = service
                .import_subscribers(request(text))
                .await
                .expect("import");
            counts.push((outcome.imported, outcome.skipped));
        }
        counts
    });

    assert_eq!(counts, [(2, 0), (1, 2), (0, 3)]);
    assert_eq!(
        context.count(
            "SELECT COUNT(*) FROM subscribers WHERE org_id = $1",
            &[&org_id.as_ref()]
        ),
        3
    );
}
