use diesel::insert_into;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, VarChar};
use indoc::indoc;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::Translator;
use crate::schema::translators;
use crate::DbConnection;

use super::common;

#[derive(Deserialize)]
pub struct NewTranslator {
    pub user_id: String,
    pub username: Option<String>,
    pub display_name: String,
    pub bio: Option<String>,
}

#[derive(AsChangeset, Deserialize)]
#[table_name = "translators"]
pub struct TranslatorChanges {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

#[derive(QueryableByName, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatorStats {
    #[sql_type = "BigInt"]
    pub novels_count: i64,
    #[sql_type = "BigInt"]
    pub chapters_count: i64,
    #[sql_type = "BigInt"]
    pub subscribers_count: i64,
    #[sql_type = "BigInt"]
    pub total_views: i64,
}

pub fn create_translator(
    connection: &DbConnection,
    new: NewTranslator,
) -> Result<Translator, ApiError> {
    Ok(insert_into(translators::table)
        .values((
            translators::user_id.eq(new.user_id),
            translators::username.eq(new.username),
            translators::display_name.eq(new.display_name),
            translators::bio.eq(new.bio),
            translators::created_at.eq(common::get_current_timestamp()),
        ))
        .get_result(connection)?)
}

pub fn get_translator(connection: &DbConnection, user_id: &str) -> Result<Translator, ApiError> {
    translators::table
        .find(user_id)
        .first(connection)
        .optional()?
        .ok_or(ApiError::NotFound("translator"))
}

pub fn update_translator(
    connection: &DbConnection,
    user_id: &str,
    changes: TranslatorChanges,
) -> Result<Translator, ApiError> {
    diesel::update(translators::table.find(user_id))
        .set(changes)
        .get_result(connection)
        .optional()?
        .ok_or(ApiError::NotFound("translator"))
}

/// Aggregates over the translator's novels; all zeroes when they own none.
pub fn get_translator_stats(
    connection: &DbConnection,
    user_id: &str,
) -> Result<TranslatorStats, ApiError> {
    let sql = indoc! {"
        SELECT COUNT(*) AS novels_count,
               CAST(COALESCE(SUM(chapters_count), 0) AS BIGINT) AS chapters_count,
               CAST(COALESCE(SUM(subscribers_count), 0) AS BIGINT) AS subscribers_count,
               CAST(COALESCE(SUM(views), 0) AS BIGINT) AS total_views
            FROM novels
            WHERE translator_id = $1
    "};
    Ok(sql_query(sql)
        .bind::<VarChar, _>(user_id)
        .get_result(connection)?)
}

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    use super::super::common::test_support::*;
    use super::*;
    use crate::database;

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn created_translator_reads_back_identically() {
        let connection = test_connection();
        let created = create_translator(
            &connection,
            NewTranslator {
                user_id: "u-100".to_owned(),
                username: Some("@lotus".to_owned()),
                display_name: "Lotus".to_owned(),
                bio: Some("translating xianxia".to_owned()),
            },
        )
        .unwrap();
        let fetched = get_translator(&connection, "u-100").unwrap();
        assert_eq!(fetched.user_id, created.user_id);
        assert_eq!(fetched.username, created.username);
        assert_eq!(fetched.display_name, created.display_name);
        assert_eq!(fetched.bio, created.bio);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn duplicate_user_id_is_a_unique_violation() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        let duplicate = create_translator(
            &connection,
            NewTranslator {
                user_id: "u-100".to_owned(),
                username: None,
                display_name: "Impostor".to_owned(),
                bio: None,
            },
        );
        match duplicate {
            Err(ApiError::Database(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            ))) => {}
            other => panic!("expected a unique violation, got {:?}", other.err()),
        }
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn missing_translator_is_not_found() {
        let connection = test_connection();
        assert_not_found(get_translator(&connection, "nobody"));
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn partial_update_keeps_untouched_fields() {
        let connection = test_connection();
        let created = create_translator(
            &connection,
            NewTranslator {
                user_id: "u-100".to_owned(),
                username: Some("@lotus".to_owned()),
                display_name: "Lotus".to_owned(),
                bio: Some("translating xianxia".to_owned()),
            },
        )
        .unwrap();

        let updated = update_translator(
            &connection,
            "u-100",
            TranslatorChanges {
                username: None,
                display_name: Some("Lotus Prime".to_owned()),
                bio: None,
            },
        )
        .unwrap();

        assert_eq!(updated.display_name, "Lotus Prime");
        assert_eq!(updated.username, created.username);
        assert_eq!(updated.bio, created.bio);
        assert_eq!(updated.created_at, created.created_at);

        assert_not_found(update_translator(
            &connection,
            "nobody",
            TranslatorChanges {
                username: None,
                display_name: Some("Ghost".to_owned()),
                bio: None,
            },
        ));
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn stats_are_zero_filled_without_novels() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        let stats = get_translator_stats(&connection, "u-100").unwrap();
        assert_eq!(stats.novels_count, 0);
        assert_eq!(stats.chapters_count, 0);
        assert_eq!(stats.subscribers_count, 0);
        assert_eq!(stats.total_views, 0);
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn stats_aggregate_across_the_translators_novels() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        let first = seed_novel(&connection, "u-100", "Sword Saint");
        let second = seed_novel(&connection, "u-100", "Mist Court");
        for novel in [&first, &second] {
            database::chapter::create_chapter(
                &connection,
                novel.id,
                database::chapter::NewChapter {
                    chapter_number: 1,
                    title: "Prologue".to_owned(),
                    content: "...".to_owned(),
                },
            )
            .unwrap();
        }
        // Fetching bumps the view counters the stats should sum.
        database::novel::get_novel(&connection, first.id).unwrap();
        database::novel::get_novel(&connection, first.id).unwrap();
        database::novel::get_novel(&connection, second.id).unwrap();
        let stats = get_translator_stats(&connection, "u-100").unwrap();
        assert_eq!(stats.novels_count, 2);
        assert_eq!(stats.chapters_count, 2);
        assert_eq!(stats.total_views, 3);
    }
}
