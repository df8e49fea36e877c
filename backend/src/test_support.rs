//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! with the `test-support` feature.

pub mod clock {
    //! Controllable clocks for dedup-window and timestamp assertions.

    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use mockable::Clock;

    /// Fixed instant used by fixtures unless a test needs another one.
    pub fn fixture_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    /// Clock that only moves when told to.
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Clock frozen at [`fixture_timestamp`].
        pub fn at_fixture() -> Self {
            Self::new(fixture_timestamp())
        }

        pub fn advance(&self, delta: Duration) {
            let delta = match TimeDelta::from_std(delta) {
                Ok(delta) => delta,
                Err(error) => {
                    panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
                }
            };
            *self.lock_clock() += delta;
        }

        pub fn advance_seconds(&self, seconds: i64) {
            *self.lock_clock() += TimeDelta::seconds(seconds);
        }

        fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic if not an Object.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => {
                panic!(
                    "schema '{name}' is a $ref to '{}'; resolve the reference first",
                    reference.ref_location
                );
            }
            RefOr::T(Schema::Array(_)) => {
                panic!("schema '{name}' is an Array, not an Object");
            }
            _ => panic!("schema '{name}' is not a plain object"),
        }
    }
}

pub mod http {
    //! In-memory wiring of every driving port for handler tests.

    use std::sync::Arc;

    use mockable::Clock;

    use super::clock::MutableClock;
    use crate::domain::ports::ConfiguredLoginService;
    use crate::domain::{
        CampaignService, ConversionStatsService, ConversionTrackingService, IdempotencyConfig,
        OrgDataExportService, OrgProvisioningService, OrgSettingsService, SubscriberImportService,
        UserId,
    };
    use crate::inbound::http::state::{HttpConfig, HttpState, HttpStatePorts};
    use crate::outbound::cache::MemoryResponseCache;
    use crate::outbound::memory::MemoryStore;

    pub const TRACKING_BASE_URL: &str = "https://t.example";

    /// Physician signing in as the owner of the first clinic.
    pub const CHEN: FixtureAccount = FixtureAccount {
        username: "dr.chen",
        password: "s3cret",
        user_id: "3fa85f64-5717-4562-b3fc-2c963f66afa6",
    };

    /// Second physician, used for cross-tenant checks.
    pub const LIN: FixtureAccount = FixtureAccount {
        username: "dr.lin",
        password: "hunter22",
        user_id: "123e4567-e89b-12d3-a456-426614174000",
    };

    #[derive(Debug, Clone, Copy)]
    pub struct FixtureAccount {
        pub username: &'static str,
        pub password: &'static str,
        pub user_id: &'static str,
    }

    impl FixtureAccount {
        pub fn id(&self) -> UserId {
            UserId::new(self.user_id).expect("fixture user id")
        }
    }

    /// Handler state backed by a shared [`MemoryStore`] and a controllable
    /// clock.
    pub struct MemoryHarness {
        pub store: Arc<MemoryStore>,
        pub clock: Arc<MutableClock>,
        pub state: HttpState,
    }

    pub fn memory_harness() -> MemoryHarness {
        memory_harness_with(HttpConfig::default(), IdempotencyConfig::default())
    }

    pub fn memory_harness_with(config: HttpConfig, idempotency: IdempotencyConfig) -> MemoryHarness {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(MutableClock::at_fixture());
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let cache = Arc::new(MemoryResponseCache::new(dyn_clock.clone()));
        let login = ConfiguredLoginService::new()
            .with_account(CHEN.username, CHEN.password, CHEN.id())
            .with_account(LIN.username, LIN.password, LIN.id());

        let ports = HttpStatePorts {
            login: Arc::new(login),
            provisioning: Arc::new(OrgProvisioningService::new(store.clone())),
            imports: Arc::new(SubscriberImportService::new(
                store.clone(),
                store.clone(),
                dyn_clock.clone(),
            )),
            tracking: Arc::new(
                ConversionTrackingService::new(
                    store.clone(),
                    store.clone(),
                    store.clone(),
                    dyn_clock.clone(),
                )
                .with_config(idempotency),
            ),
            stats: Arc::new(ConversionStatsService::new(
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            campaigns: Arc::new(CampaignService::new(
                store.clone(),
                store.clone(),
                dyn_clock.clone(),
                TRACKING_BASE_URL,
            )),
            settings: Arc::new(OrgSettingsService::new(
                store.clone(),
                store.clone(),
                dyn_clock.clone(),
            )),
            exports: Arc::new(
                OrgDataExportService::new(store.clone(), store.clone(), store.clone(), cache)
                    .with_config(idempotency),
            ),
        };
        MemoryHarness {
            store,
            clock,
            state: HttpState::with_config(ports, config),
        }
    }
}
