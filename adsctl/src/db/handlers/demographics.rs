//! Database repository for user demographics.

use crate::{
    db::{
        errors::Result,
        models::demographics::{
            AgeRange, DemographicsPerformance, DemographicsSummary, DemographicsUpsert, Gender, UserDemographics,
        },
    },
    types::{UserId, abbrev_uuid},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const DEMOGRAPHICS_COLUMNS: &str = "id, user_id, age_range, gender, confidence, data_source, privacy_compliant, \
     last_updated_from_api, created_at, updated_at, deleted_at";

/// An upserted row, flagged with whether the upsert inserted it
#[derive(Debug, FromRow)]
pub struct UpsertedDemographics {
    #[sqlx(flatten)]
    pub record: UserDemographics,
    pub inserted: bool,
}

pub struct Demographics<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Demographics<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get_by_user(&mut self, user_id: UserId) -> Result<Option<UserDemographics>> {
        let record = sqlx::query_as::<_, UserDemographics>(&format!(
            "SELECT {DEMOGRAPHICS_COLUMNS} FROM user_demographics WHERE user_id = $1 AND deleted_at IS NULL"
        ))
        .bind(user_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(record)
    }

    /// Insert or overwrite the live record for a user.
    ///
    /// `xmax = 0` holds only for freshly inserted tuples, which distinguishes inserts from
    /// conflict updates without a second round trip.
    #[instrument(skip(self, record), fields(user_id = %abbrev_uuid(&record.user_id)), err)]
    pub async fn upsert(&mut self, record: &DemographicsUpsert) -> Result<UpsertedDemographics> {
        let row = sqlx::query_as::<_, UpsertedDemographics>(&format!(
            r#"
            INSERT INTO user_demographics (
                user_id, age_range, gender, confidence, data_source, privacy_compliant, last_updated_from_api
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) WHERE deleted_at IS NULL DO UPDATE SET
                age_range = EXCLUDED.age_range,
                gender = EXCLUDED.gender,
                confidence = EXCLUDED.confidence,
                data_source = EXCLUDED.data_source,
                privacy_compliant = EXCLUDED.privacy_compliant,
                last_updated_from_api = EXCLUDED.last_updated_from_api,
                updated_at = NOW()
            RETURNING {DEMOGRAPHICS_COLUMNS}, (xmax = 0) AS inserted
            "#
        ))
        .bind(record.user_id)
        .bind(record.age_range)
        .bind(record.gender)
        .bind(record.confidence)
        .bind(&record.data_source)
        .bind(record.privacy_compliant)
        .bind(record.last_updated_from_api)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), err)]
    pub async fn list_stale(&mut self, cutoff: DateTime<Utc>) -> Result<Vec<UserDemographics>> {
        let records = sqlx::query_as::<_, UserDemographics>(&format!(
            r#"
            SELECT {DEMOGRAPHICS_COLUMNS}
            FROM user_demographics
            WHERE last_updated_from_api < $1 AND deleted_at IS NULL
            ORDER BY last_updated_from_api ASC
            "#
        ))
        .bind(cutoff)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(records)
    }

    #[instrument(skip(self), err)]
    pub async fn summary(&mut self) -> Result<DemographicsSummary> {
        let age_rows = sqlx::query_as::<_, (AgeRange, i64)>(
            "SELECT age_range, COUNT(*) FROM user_demographics WHERE deleted_at IS NULL GROUP BY age_range",
        )
        .fetch_all(&mut *self.db)
        .await?;

        let gender_rows = sqlx::query_as::<_, (Gender, i64)>(
            "SELECT gender, COUNT(*) FROM user_demographics WHERE deleted_at IS NULL GROUP BY gender",
        )
        .fetch_all(&mut *self.db)
        .await?;

        let (total_users, last_updated) = sqlx::query_as::<_, (i64, Option<DateTime<Utc>>)>(
            "SELECT COUNT(*), MAX(last_updated_from_api) FROM user_demographics WHERE deleted_at IS NULL",
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(DemographicsSummary {
            age_distribution: age_rows.into_iter().collect(),
            gender_distribution: gender_rows.into_iter().collect(),
            total_users,
            last_updated,
        })
    }

    #[instrument(skip(self), err)]
    pub async fn performance(&mut self) -> Result<Vec<DemographicsPerformance>> {
        let rows = sqlx::query_as::<_, DemographicsPerformance>(
            r#"
            SELECT
                ud.age_range,
                ud.gender,
                COUNT(DISTINCT ud.user_id) AS user_count,
                COALESCE(AVG(c.click_through_rate), 0)::DOUBLE PRECISION AS click_through_rate,
                COALESCE(AVG(c.conversion_rate), 0)::DOUBLE PRECISION AS conversion_rate,
                COALESCE(AVG(c.average_cpc), 0)::DOUBLE PRECISION AS average_cpc,
                COALESCE(AVG(c.roas), 0)::DOUBLE PRECISION AS roas
            FROM user_demographics ud
            LEFT JOIN campaigns c ON c.user_id = ud.user_id AND c.deleted_at IS NULL
            WHERE ud.deleted_at IS NULL
            GROUP BY ud.age_range, ud.gender
            ORDER BY user_count DESC, ud.age_range ASC, ud.gender ASC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }
}
