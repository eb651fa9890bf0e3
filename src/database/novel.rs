use diesel::insert_into;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, VarChar};
use indoc::indoc;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::Novel;
use crate::schema::novels;
use crate::DbConnection;

use super::common;

#[derive(Deserialize)]
pub struct NewNovel {
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub translator_id: String,
}

#[derive(AsChangeset, Deserialize)]
#[table_name = "novels"]
pub struct NovelChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub status: Option<String>,
}

pub fn create_novel(connection: &DbConnection, new: NewNovel) -> Result<Novel, ApiError> {
    let now = common::get_current_timestamp();
    Ok(insert_into(novels::table)
        .values((
            novels::title.eq(new.title),
            novels::description.eq(new.description),
            novels::cover_url.eq(new.cover_url),
            novels::translator_id.eq(Some(new.translator_id)),
            novels::created_at.eq(now),
            novels::updated_at.eq(now),
        ))
        .get_result(connection)?)
}

/// Fetch-by-id doubles as the view counter: one UPDATE .. RETURNING both
/// bumps `views` and reads the row back.
pub fn get_novel(connection: &DbConnection, novel_id: i32) -> Result<Novel, ApiError> {
    diesel::update(novels::table.find(novel_id))
        .set(novels::views.eq(novels::views + 1))
        .get_result(connection)
        .optional()?
        .ok_or(ApiError::NotFound("novel"))
}

/// Paged listing with two optional filters. Each filter combination is its
/// own fully parameterized statement via `into_boxed`.
pub fn list_novels(
    connection: &DbConnection,
    offset: i64,
    limit: i64,
    translator_id: Option<String>,
    ids: Option<Vec<i32>>,
) -> Result<Vec<Novel>, ApiError> {
    let mut query = novels::table.into_boxed();
    if let Some(translator_id) = translator_id {
        query = query.filter(novels::translator_id.eq(translator_id));
    }
    if let Some(ids) = ids {
        query = query.filter(novels::id.eq_any(ids));
    }
    Ok(query
        .order(novels::updated_at.desc())
        .offset(offset)
        .limit(limit)
        .load(connection)?)
}

pub fn update_novel(
    connection: &DbConnection,
    novel_id: i32,
    changes: NovelChanges,
) -> Result<Novel, ApiError> {
    diesel::update(novels::table.find(novel_id))
        .set((
            changes,
            novels::updated_at.eq(common::get_current_timestamp()),
        ))
        .get_result(connection)
        .optional()?
        .ok_or(ApiError::NotFound("novel"))
}

/// Chapters and tag links go with the novel (ON DELETE CASCADE).
pub fn delete_novel(connection: &DbConnection, novel_id: i32) -> Result<(), ApiError> {
    let affected = diesel::delete(novels::table.find(novel_id)).execute(connection)?;
    if affected == 0 {
        return Err(ApiError::NotFound("novel"));
    }
    Ok(())
}

pub fn search_novels(
    connection: &DbConnection,
    query: &str,
    offset: i64,
    limit: i64,
) -> Result<Vec<Novel>, ApiError> {
    let sql = indoc! {"
        SELECT * FROM novels
            WHERE title ILIKE $1 OR description ILIKE $1
            ORDER BY updated_at DESC
            LIMIT $2
            OFFSET $3
    "};
    Ok(sql_query(sql)
        .bind::<VarChar, _>(format!("%{}%", query))
        .bind::<BigInt, _>(limit)
        .bind::<BigInt, _>(offset)
        .load(connection)?)
}

#[cfg(test)]
mod tests {
    use super::super::common::test_support::*;
    use super::*;
    use crate::database;

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn missing_novel_is_not_found() {
        let connection = test_connection();
        assert_not_found(get_novel(&connection, 123456));
        assert_not_found(delete_novel(&connection, 123456));
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn every_fetch_increments_views_by_one() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        let novel = seed_novel(&connection, "u-100", "Sword Saint");
        assert_eq!(novel.views, 0);
        assert_eq!(get_novel(&connection, novel.id).unwrap().views, 1);
        assert_eq!(get_novel(&connection, novel.id).unwrap().views, 2);
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn listing_is_not_a_fetch_and_leaves_views_alone() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        let novel = seed_novel(&connection, "u-100", "Sword Saint");
        let listed = list_novels(&connection, 0, 20, None, Some(vec![novel.id])).unwrap();
        assert_eq!(listed[0].views, 0);
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn ids_filter_returns_exactly_those_novels_newest_first() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        let first = seed_novel(&connection, "u-100", "Alpha");
        let second = seed_novel(&connection, "u-100", "Beta");
        let _third = seed_novel(&connection, "u-100", "Gamma");
        // Bump `first` so it sorts ahead of `second` again.
        diesel::update(novels::table.find(first.id))
            .set(novels::updated_at.eq(second.updated_at + 1000))
            .execute(&connection)
            .unwrap();
        let listed = list_novels(
            &connection,
            0,
            20,
            None,
            Some(vec![first.id, second.id, 999_999]),
        )
        .unwrap();
        let ids: Vec<i32> = listed.iter().map(|novel| novel.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn translator_filter_only_returns_their_novels() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        seed_translator(&connection, "u-200");
        seed_novel(&connection, "u-100", "Mine");
        seed_novel(&connection, "u-200", "Theirs");
        let listed =
            list_novels(&connection, 0, 20, Some("u-100".to_owned()), None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Mine");
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn partial_update_changes_only_the_given_fields() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        let novel = seed_novel_described(&connection, "u-100", "Sword Saint", Some("old blurb"));
        let backdated = novel.updated_at - 10_000;
        diesel::update(novels::table.find(novel.id))
            .set(novels::updated_at.eq(backdated))
            .execute(&connection)
            .unwrap();

        let updated = update_novel(
            &connection,
            novel.id,
            NovelChanges {
                title: None,
                description: Some("new blurb".to_owned()),
                cover_url: None,
                status: Some("completed".to_owned()),
            },
        )
        .unwrap();

        assert_eq!(updated.title, "Sword Saint");
        assert_eq!(updated.description.as_deref(), Some("new blurb"));
        assert_eq!(updated.status, "completed");
        assert_eq!(updated.cover_url, None);
        assert!(updated.updated_at > backdated);

        assert_not_found(update_novel(
            &connection,
            123456,
            NovelChanges {
                title: Some("Ghost".to_owned()),
                description: None,
                cover_url: None,
                status: None,
            },
        ));
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn search_is_case_insensitive_over_title_and_description() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        seed_novel(&connection, "u-100", "The ABCs of Cultivation");
        seed_novel_described(&connection, "u-100", "Mist Court", Some("an abc primer"));
        seed_novel(&connection, "u-100", "Unrelated");
        let matched = search_novels(&connection, "abc", 0, 20).unwrap();
        let titles: Vec<&str> = matched.iter().map(|novel| novel.title.as_str()).collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"The ABCs of Cultivation"));
        assert!(titles.contains(&"Mist Court"));
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn deleting_a_novel_cascades_to_chapters_and_tag_links() {
        let connection = test_connection();
        seed_translator(&connection, "u-100");
        let novel = seed_novel(&connection, "u-100", "Sword Saint");
        let chapter = database::chapter::create_chapter(
            &connection,
            novel.id,
            database::chapter::NewChapter {
                chapter_number: 1,
                title: "Prologue".to_owned(),
                content: "...".to_owned(),
            },
        )
        .unwrap();
        database::tag::update_novel_tags(&connection, novel.id, vec!["action".to_owned()])
            .unwrap();

        delete_novel(&connection, novel.id).unwrap();

        assert_not_found(get_novel(&connection, novel.id));
        assert_not_found(database::chapter::get_chapter(
            &connection,
            novel.id,
            chapter.id,
        ));
        use crate::schema::novel_tags;
        let links: i64 = novel_tags::table
            .filter(novel_tags::novel_id.eq(novel.id))
            .count()
            .get_result(&connection)
            .unwrap();
        assert_eq!(links, 0);
    }
}
