table! {
    chapters (id) {
        id -> Int4,
        novel_id -> Int4,
        chapter_number -> Int4,
        title -> Varchar,
        content -> Varchar,
        created_at -> Int8,
        updated_at -> Int8,
        views -> Int8,
    }
}

table! {
    novel_tags (novel_id, tag_id) {
        novel_id -> Int4,
        tag_id -> Int4,
    }
}

table! {
    novels (id) {
        id -> Int4,
        title -> Varchar,
        description -> Nullable<Varchar>,
        cover_url -> Nullable<Varchar>,
        translator_id -> Nullable<Varchar>,
        status -> Varchar,
        created_at -> Int8,
        updated_at -> Int8,
        views -> Int8,
        subscribers_count -> Int8,
        chapters_count -> Int8,
    }
}

table! {
    tags (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    translators (user_id) {
        user_id -> Varchar,
        username -> Nullable<Varchar>,
        display_name -> Varchar,
        bio -> Nullable<Varchar>,
        created_at -> Int8,
    }
}

joinable!(chapters -> novels (novel_id));
joinable!(novels -> translators (translator_id));
joinable!(novel_tags -> novels (novel_id));
joinable!(novel_tags -> tags (tag_id));

allow_tables_to_appear_in_same_query!(
    chapters,
    novel_tags,
    novels,
    tags,
    translators,
);
