use diesel::dsl::{exists, select};
use diesel::insert_into;
use diesel::prelude::*;

use crate::error::ApiError;
use crate::models::Tag;
use crate::schema::{novel_tags, novels, tags};
use crate::DbConnection;

pub fn list_tags(connection: &DbConnection) -> Result<Vec<Tag>, ApiError> {
    Ok(tags::table.order(tags::name.asc()).load(connection)?)
}

pub fn get_novel_tags(connection: &DbConnection, novel_id: i32) -> Result<Vec<Tag>, ApiError> {
    Ok(novel_tags::table
        .inner_join(tags::table)
        .filter(novel_tags::novel_id.eq(novel_id))
        .select(tags::table::all_columns())
        .order(tags::name.asc())
        .load(connection)?)
}

/// Replaces the novel's tag set: tag rows are upserted by name, then the link
/// rows are swapped out, all in one transaction.
pub fn update_novel_tags(
    connection: &DbConnection,
    novel_id: i32,
    names: Vec<String>,
) -> Result<Vec<Tag>, ApiError> {
    let mut names: Vec<String> = names
        .into_iter()
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    connection.transaction::<Vec<Tag>, ApiError, _>(|| {
        let novel_exists: bool =
            select(exists(novels::table.filter(novels::id.eq(novel_id)))).get_result(connection)?;
        if !novel_exists {
            return Err(ApiError::NotFound("novel"));
        }
        diesel::delete(novel_tags::table.filter(novel_tags::novel_id.eq(novel_id)))
            .execute(connection)?;
        if !names.is_empty() {
            insert_into(tags::table)
                .values(
                    names
                        .iter()
                        .map(|name| tags::name.eq(name))
                        .collect::<Vec<_>>(),
                )
                .on_conflict(tags::name)
                .do_nothing()
                .execute(connection)?;
            let tag_ids: Vec<i32> = tags::table
                .filter(tags::name.eq_any(&names))
                .select(tags::id)
                .load(connection)?;
            insert_into(novel_tags::table)
                .values(
                    tag_ids
                        .into_iter()
                        .map(|tag_id| {
                            (
                                novel_tags::novel_id.eq(novel_id),
                                novel_tags::tag_id.eq(tag_id),
                            )
                        })
                        .collect::<Vec<_>>(),
                )
                .execute(connection)?;
        }
        get_novel_tags(connection, novel_id)
    })
}
