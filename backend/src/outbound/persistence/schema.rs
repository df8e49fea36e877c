//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When
//! migrations change, regenerate with `diesel print-schema` or update by hand.

diesel::table! {
    /// Clinic organisations.
    orgs (id) {
        id -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Membership of users in organisations.
    org_members (org_id, user_id) {
        org_id -> Varchar,
        user_id -> Uuid,
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// The single organisation each user belongs to.
    user_orgs (user_id) {
        user_id -> Uuid,
        org_id -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Newsletter audience, unique per org and normalised email.
    subscribers (org_id, email) {
        org_id -> Varchar,
        email -> Varchar,
        source -> Varchar,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Markers for CSV content already imported into an org.
    import_logs (org_id, file_hash) {
        org_id -> Varchar,
        file_hash -> Varchar,
        first_imported_at -> Timestamptz,
    }
}

diesel::table! {
    newsletter_campaigns (id) {
        id -> Varchar,
        org_id -> Varchar,
        title -> Text,
        body -> Text,
        cta_url -> Text,
        cta_label -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Global tracking id to destination mapping.
    tracking_links (id) {
        id -> Varchar,
        org_id -> Varchar,
        campaign_id -> Varchar,
        target_url -> Text,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only open/click events.
    conversion_logs (id) {
        id -> Int8,
        org_id -> Varchar,
        tracking_id -> Nullable<Varchar>,
        campaign_id -> Nullable<Varchar>,
        event_type -> Varchar,
        recipient_ref -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    org_configs (org_id) {
        org_id -> Varchar,
        clinic_name -> Text,
        unsubscribe_base_url -> Text,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(org_members -> orgs (org_id));
diesel::joinable!(user_orgs -> orgs (org_id));
diesel::joinable!(subscribers -> orgs (org_id));
diesel::joinable!(import_logs -> orgs (org_id));
diesel::joinable!(newsletter_campaigns -> orgs (org_id));
diesel::joinable!(tracking_links -> orgs (org_id));
diesel::joinable!(org_configs -> orgs (org_id));

diesel::allow_tables_to_appear_in_same_query!(
    orgs,
    org_members,
    user_orgs,
    subscribers,
    import_logs,
    newsletter_campaigns,
    tracking_links,
    conversion_logs,
    org_configs,
);
