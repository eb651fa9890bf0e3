use serde::Serialize;

use crate::schema::chapters;
use crate::schema::novels;
use crate::schema::tags;
use crate::schema::translators;

#[derive(Identifiable, Queryable, Serialize)]
#[table_name = "translators"]
#[primary_key(user_id)]
pub struct Translator {
    pub user_id: String,
    pub username: Option<String>,
    pub display_name: String,
    pub bio: Option<String>,
    pub created_at: i64,
}

// QueryableByName so search can go through sql_query (ILIKE over a nullable
// column does not compose in the DSL).
#[derive(Identifiable, Queryable, QueryableByName, Serialize)]
#[table_name = "novels"]
pub struct Novel {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub translator_id: Option<String>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub views: i64,
    pub subscribers_count: i64,
    pub chapters_count: i64,
}

#[derive(Identifiable, Queryable, Serialize)]
#[table_name = "chapters"]
pub struct Chapter {
    pub id: i32,
    pub novel_id: i32,
    pub chapter_number: i32,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub views: i64,
}

#[derive(Identifiable, Queryable, Serialize)]
#[table_name = "tags"]
pub struct Tag {
    pub id: i32,
    pub name: String,
}
