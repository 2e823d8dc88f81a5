diesel::table! {
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        role -> Text,
        bio -> Nullable<Text>,
        image_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    mentor_profiles (id) {
        id -> Uuid,
        user_id -> Uuid,
        headline -> Text,
        company -> Nullable<Text>,
        skills -> Array<Text>,
        years_experience -> Int4,
        hourly_rate_cents -> Nullable<Int4>,
        location -> Nullable<Text>,
        about -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    availability (id) {
        id -> Uuid,
        mentor_profile_id -> Uuid,
        weekday -> Int2,
        slots -> Array<Text>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    sessions (id) {
        id -> Uuid,
        mentor_id -> Uuid,
        mentee_id -> Uuid,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        status -> Text,
        topic -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    connections (id) {
        id -> Uuid,
        mentor_id -> Uuid,
        mentee_id -> Uuid,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        connection_id -> Uuid,
        sender_id -> Uuid,
        content -> Text,
        read_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        recipient_id -> Uuid,
        sender_id -> Nullable<Uuid>,
        kind -> Text,
        body -> Text,
        read_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    password_reset_tokens (id) {
        id -> Uuid,
        user_id -> Uuid,
        token -> Varchar,
        expires_at -> Timestamptz,
        used -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(mentor_profiles -> users (user_id));
diesel::joinable!(availability -> mentor_profiles (mentor_profile_id));
diesel::joinable!(messages -> connections (connection_id));
diesel::joinable!(password_reset_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    mentor_profiles,
    availability,
    sessions,
    connections,
    messages,
    notifications,
    password_reset_tokens,
);
