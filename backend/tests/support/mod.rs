//! Shared helpers for the Diesel adapter suites.
//!
//! Each suite gets its own database on an embedded cluster, rebuilt from the
//! embedded migrations, and a small pool over it. Setup failures panic unless
//! `SKIP_TEST_CLUSTER` is truthy, in which case the test is skipped.

use clinic_newsletter::domain::ports::OrgRepository;
use clinic_newsletter::domain::{OrgId, UserId};
use clinic_newsletter::outbound::persistence::{
    DbPool, DieselOrgRepository, PoolConfig, run_pending_migrations,
};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;

#[path = "pg_embed.rs"]
mod pg_embed;

/// Live cluster, runtime and pool for one test.
pub struct PgContext {
    pub runtime: Runtime,
    pub pool: DbPool,
    pub database_url: String,
    _cluster: TestCluster,
}

impl PgContext {
    /// Provision `user_id` an org through the Diesel adapter.
    pub fn provision_org(&self, user_id: &UserId) -> OrgId {
        let orgs = DieselOrgRepository::new(self.pool.clone());
        self.runtime
            .block_on(async { orgs.provision(user_id, &OrgId::generate()).await })
            .expect("org provisioned")
    }

    /// Run a scalar `COUNT(*)` query over a plain connection.
    pub fn count(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> i64 {
        let mut client = Client::connect(&self.database_url, NoTls)
            .unwrap_or_else(|err| panic!("{}", format_postgres_error(&err)));
        let row = client
            .query_one(sql, params)
            .unwrap_or_else(|err| panic!("{}", format_postgres_error(&err)));
        row.get(0)
    }
}

/// Render a `postgres` error with the SQLSTATE and server message.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when `SKIP_TEST_CLUSTER` is truthy; otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Drop and recreate `name` so every run starts from an empty schema.
fn reset_database(cluster: &TestCluster, name: &str) -> Result<(), String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client =
        Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    // Separate statements: neither may run inside a transaction block.
    client
        .batch_execute(&format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
        .map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))
}

fn setup(database: &str, max_size: u32) -> Result<PgContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = pg_embed::test_cluster()?;
    reset_database(&cluster, database)?;
    let database_url = cluster.connection().database_url(database);
    run_pending_migrations(&database_url).map_err(|err| err.to_string())?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(max_size)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(PgContext {
        runtime,
        pool,
        database_url,
        _cluster: cluster,
    })
}

/// Migrated database named `database` with a pool of `max_size`
/// connections, or `None` when the cluster is skipped.
pub fn pg_context(database: &str, max_size: u32) -> Option<PgContext> {
    match setup(database, max_size) {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}
