//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Users known to the sleep tracker. Managed outside this service.
    users (id) {
        id -> Uuid,
        /// Display name echoed in feed entries (max 64 characters).
        display_name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges. The pair is the primary key and a check
    /// constraint rejects self-follows.
    follows (follower_id, followee_id) {
        follower_id -> Uuid,
        followee_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sleep sessions. `ended_at` and `duration_minutes` are null while the
    /// session is active; a GiST exclusion constraint forbids overlapping
    /// sessions per user.
    sleep_records (id) {
        id -> Uuid,
        user_id -> Uuid,
        started_at -> Timestamptz,
        ended_at -> Nullable<Timestamptz>,
        /// Whole minutes between start and end, derived on clock-out.
        duration_minutes -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(sleep_records -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(follows, sleep_records, users);
