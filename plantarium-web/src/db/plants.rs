//! Plant catalogue persistence
//!
//! Thin parameterized-query gateway over the plants table. Writes are
//! single-table only; timestamps are assigned here, not by callers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use plantarium_common::{Error, Result};

/// Column values accepted for an insert or full update
#[derive(Debug, Clone, Default)]
pub struct PlantInput {
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub family: Option<String>,
    pub family_common_name: Option<String>,
    pub genus: Option<String>,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub bibliography: Option<String>,
    pub year: Option<i32>,
    pub synonyms: Option<Vec<String>>,
    pub slug: Option<String>,
    pub trefle_id: Option<i64>,
    pub perenual_id: Option<i64>,
    pub metadata: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub nickname: Option<String>,
    pub location: Option<String>,
    pub acquired_date: Option<String>,
    pub status: Option<String>,
}

/// Row summary returned by an insert
#[derive(Debug, Clone, Serialize)]
pub struct InsertedPlant {
    pub id: i64,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Row summary returned by an update
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedPlant {
    pub id: i64,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Full stored plant row
#[derive(Debug, Clone, Serialize)]
pub struct Plant {
    pub id: i64,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub family: Option<String>,
    pub family_common_name: Option<String>,
    pub genus: Option<String>,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub bibliography: Option<String>,
    pub year: Option<i32>,
    pub synonyms: Option<Vec<String>>,
    pub slug: Option<String>,
    pub trefle_id: Option<i64>,
    pub perenual_id: Option<i64>,
    pub metadata: serde_json::Value,
    pub notes: Option<String>,
    pub nickname: Option<String>,
    pub location: Option<String>,
    pub acquired_date: Option<String>,
    pub status: Option<String>,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection returned by the list endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PlantListEntry {
    pub id: i64,
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub family: Option<String>,
    pub family_common_name: Option<String>,
    pub genus: Option<String>,
    pub image_url: Option<String>,
    pub nickname: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub metadata: serde_json::Value,
    pub added_at: DateTime<Utc>,
}

/// Insert a new plant, returning its summary
pub async fn insert_plant(pool: &SqlitePool, input: &PlantInput) -> Result<InsertedPlant> {
    let synonyms = serialize_synonyms(input.synonyms.as_deref())?;
    let metadata = serialize_metadata(input.metadata.as_ref())?;
    let now = Utc::now().to_rfc3339();

    let row = sqlx::query(
        r#"
        INSERT INTO plants (
            scientific_name, common_name, family, family_common_name,
            genus, image_url, author, bibliography, year, synonyms,
            slug, trefle_id, perenual_id, metadata, notes, nickname,
            location, acquired_date, status, added_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, scientific_name, common_name, added_at
        "#,
    )
    .bind(&input.scientific_name)
    .bind(&input.common_name)
    .bind(&input.family)
    .bind(&input.family_common_name)
    .bind(&input.genus)
    .bind(&input.image_url)
    .bind(&input.author)
    .bind(&input.bibliography)
    .bind(input.year)
    .bind(&synonyms)
    .bind(&input.slug)
    .bind(input.trefle_id)
    .bind(input.perenual_id)
    .bind(&metadata)
    .bind(&input.notes)
    .bind(&input.nickname)
    .bind(&input.location)
    .bind(&input.acquired_date)
    .bind(&input.status)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    Ok(InsertedPlant {
        id: row.get("id"),
        scientific_name: row.get("scientific_name"),
        common_name: row.get("common_name"),
        added_at: parse_timestamp(&row.get::<String, _>("added_at"), "added_at")?,
    })
}

/// Update an existing plant. Returns None when the id is unknown.
pub async fn update_plant(
    pool: &SqlitePool,
    id: i64,
    input: &PlantInput,
) -> Result<Option<UpdatedPlant>> {
    let synonyms = serialize_synonyms(input.synonyms.as_deref())?;
    let metadata = serialize_metadata(input.metadata.as_ref())?;
    let now = Utc::now().to_rfc3339();

    let row = sqlx::query(
        r#"
        UPDATE plants SET
            scientific_name = ?,
            common_name = ?,
            family = ?,
            family_common_name = ?,
            genus = ?,
            image_url = ?,
            author = ?,
            bibliography = ?,
            year = ?,
            synonyms = ?,
            slug = ?,
            trefle_id = ?,
            perenual_id = ?,
            metadata = ?,
            notes = ?,
            nickname = ?,
            location = ?,
            acquired_date = ?,
            status = ?,
            updated_at = ?
        WHERE id = ?
        RETURNING id, scientific_name, common_name, updated_at
        "#,
    )
    .bind(&input.scientific_name)
    .bind(&input.common_name)
    .bind(&input.family)
    .bind(&input.family_common_name)
    .bind(&input.genus)
    .bind(&input.image_url)
    .bind(&input.author)
    .bind(&input.bibliography)
    .bind(input.year)
    .bind(&synonyms)
    .bind(&input.slug)
    .bind(input.trefle_id)
    .bind(input.perenual_id)
    .bind(&metadata)
    .bind(&input.notes)
    .bind(&input.nickname)
    .bind(&input.location)
    .bind(&input.acquired_date)
    .bind(&input.status)
    .bind(&now)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(UpdatedPlant {
            id: row.get("id"),
            scientific_name: row.get("scientific_name"),
            common_name: row.get("common_name"),
            updated_at: parse_timestamp(&row.get::<String, _>("updated_at"), "updated_at")?,
        })),
        None => Ok(None),
    }
}

/// Fetch one plant by id
pub async fn get_plant(pool: &SqlitePool, id: i64) -> Result<Option<Plant>> {
    let row = sqlx::query("SELECT * FROM plants WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(plant_from_row(&row)?)),
        None => Ok(None),
    }
}

/// List all plants, most recently added first
pub async fn list_plants(pool: &SqlitePool) -> Result<Vec<PlantListEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, scientific_name, common_name, family, family_common_name,
               genus, image_url, nickname, location, status, metadata, added_at
        FROM plants
        ORDER BY added_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(PlantListEntry {
                id: row.get("id"),
                scientific_name: row.get("scientific_name"),
                common_name: row.get("common_name"),
                family: row.get("family"),
                family_common_name: row.get("family_common_name"),
                genus: row.get("genus"),
                image_url: row.get("image_url"),
                nickname: row.get("nickname"),
                location: row.get("location"),
                status: row.get("status"),
                metadata: parse_metadata(&row.get::<String, _>("metadata"))?,
                added_at: parse_timestamp(&row.get::<String, _>("added_at"), "added_at")?,
            })
        })
        .collect()
}

fn plant_from_row(row: &SqliteRow) -> Result<Plant> {
    let synonyms = match row.get::<Option<String>, _>("synonyms") {
        Some(raw) => Some(
            serde_json::from_str(&raw)
                .map_err(|e| Error::Internal(format!("Failed to deserialize synonyms: {}", e)))?,
        ),
        None => None,
    };

    Ok(Plant {
        id: row.get("id"),
        scientific_name: row.get("scientific_name"),
        common_name: row.get("common_name"),
        family: row.get("family"),
        family_common_name: row.get("family_common_name"),
        genus: row.get("genus"),
        image_url: row.get("image_url"),
        author: row.get("author"),
        bibliography: row.get("bibliography"),
        year: row.get("year"),
        synonyms,
        slug: row.get("slug"),
        trefle_id: row.get("trefle_id"),
        perenual_id: row.get("perenual_id"),
        metadata: parse_metadata(&row.get::<String, _>("metadata"))?,
        notes: row.get("notes"),
        nickname: row.get("nickname"),
        location: row.get("location"),
        acquired_date: row.get("acquired_date"),
        status: row.get("status"),
        added_at: parse_timestamp(&row.get::<String, _>("added_at"), "added_at")?,
        updated_at: parse_timestamp(&row.get::<String, _>("updated_at"), "updated_at")?,
    })
}

fn serialize_synonyms(synonyms: Option<&[String]>) -> Result<Option<String>> {
    synonyms
        .map(|list| {
            serde_json::to_string(list)
                .map_err(|e| Error::Internal(format!("Failed to serialize synonyms: {}", e)))
        })
        .transpose()
}

fn serialize_metadata(metadata: Option<&serde_json::Value>) -> Result<String> {
    match metadata {
        Some(value) => serde_json::to_string(value)
            .map_err(|e| Error::Internal(format!("Failed to serialize metadata: {}", e))),
        None => Ok("{}".to_string()),
    }
}

fn parse_metadata(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw)
        .map_err(|e| Error::Internal(format!("Failed to deserialize metadata: {}", e)))
}

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}
