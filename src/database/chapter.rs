use diesel::insert_into;
use diesel::prelude::*;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::Chapter;
use crate::schema::{chapters, novels, translators};
use crate::DbConnection;

use super::common;

#[derive(Deserialize)]
pub struct NewChapter {
    pub chapter_number: i32,
    pub title: String,
    pub content: String,
}

#[derive(AsChangeset, Deserialize)]
#[table_name = "chapters"]
pub struct ChapterChanges {
    pub chapter_number: Option<i32>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// One row of the latest-updates feed: the chapter plus the novel title and
/// translator display name it is listed under.
#[derive(Queryable)]
pub struct LatestChapterRecord {
    pub chapter: Chapter,
    pub novel_title: String,
    pub translator_name: Option<String>,
}

/// Inserts the chapter and bumps the parent novel's `chapters_count` and
/// `updated_at` in the same transaction; neither effect lands without the
/// other.
pub fn create_chapter(
    connection: &DbConnection,
    novel_id: i32,
    new: NewChapter,
) -> Result<Chapter, ApiError> {
    let now = common::get_current_timestamp();
    connection.transaction::<Chapter, ApiError, _>(|| {
        let chapter = insert_into(chapters::table)
            .values((
                chapters::novel_id.eq(novel_id),
                chapters::chapter_number.eq(new.chapter_number),
                chapters::title.eq(new.title),
                chapters::content.eq(new.content),
                chapters::created_at.eq(now),
                chapters::updated_at.eq(now),
            ))
            .get_result(connection)?;
        diesel::update(novels::table.find(novel_id))
            .set((
                novels::chapters_count.eq(novels::chapters_count + 1),
                novels::updated_at.eq(now),
            ))
            .execute(connection)?;
        Ok(chapter)
    })
}

pub fn get_chapter(
    connection: &DbConnection,
    novel_id: i32,
    chapter_id: i32,
) -> Result<Chapter, ApiError> {
    diesel::update(
        chapters::table
            .filter(chapters::id.eq(chapter_id))
            .filter(chapters::novel_id.eq(novel_id)),
    )
    .set(chapters::views.eq(chapters::views + 1))
    .get_result(connection)
    .optional()?
    .ok_or(ApiError::NotFound("chapter"))
}

pub fn list_chapters(
    connection: &DbConnection,
    novel_id: i32,
    offset: i64,
    limit: i64,
) -> Result<Vec<Chapter>, ApiError> {
    Ok(chapters::table
        .filter(chapters::novel_id.eq(novel_id))
        .order(chapters::chapter_number.desc())
        .offset(offset)
        .limit(limit)
        .load(connection)?)
}

pub fn update_chapter(
    connection: &DbConnection,
    novel_id: i32,
    chapter_id: i32,
    changes: ChapterChanges,
) -> Result<Chapter, ApiError> {
    diesel::update(
        chapters::table
            .filter(chapters::id.eq(chapter_id))
            .filter(chapters::novel_id.eq(novel_id)),
    )
    .set((
        changes,
        chapters::updated_at.eq(common::get_current_timestamp()),
    ))
    .get_result(connection)
    .optional()?
    .ok_or(ApiError::NotFound("chapter"))
}

/// Mirror of `create_chapter`: the row and the counter decrement commit
/// together. The parent's `updated_at` is left alone.
pub fn delete_chapter(
    connection: &DbConnection,
    novel_id: i32,
    chapter_id: i32,
) -> Result<(), ApiError> {
    connection.transaction::<(), ApiError, _>(|| {
        let affected = diesel::delete(
            chapters::table
                .filter(chapters::id.eq(chapter_id))
                .filter(chapters::novel_id.eq(novel_id)),
        )
        .execute(connection)?;
        if affected == 0 {
            return Err(ApiError::NotFound("chapter"));
        }
        diesel::update(novels::table.find(novel_id))
            .set(novels::chapters_count.eq(novels::chapters_count - 1))
            .execute(connection)?;
        Ok(())
    })
}

pub fn list_latest_chapters(
    connection: &DbConnection,
    offset: i64,
    limit: i64,
) -> Result<Vec<LatestChapterRecord>, ApiError> {
    Ok(chapters::table
        .inner_join(novels::table.left_join(translators::table))
        .select((
            chapters::table::all_columns(),
            novels::title,
            translators::display_name.nullable(),
        ))
        .order(chapters::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load(connection)?)
}
