//! Typed access to the tables on top of a [`TableStore`].

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dao::{
        models::{
            EnrollmentEntity, EnrollmentPatch, FieldEntity, FieldValues, GameEntity, GameValues,
            MatchEntity, MatchPatch, NewEnrollment, NewMatch, ProfileEntity, ProfilePatch,
        },
        query::{Filter, Query, Row, Table},
        storage::{StorageError, StorageResult},
        table_store::TableStore,
    },
    state::kits::TeamId,
};

/// Entity repository shared by every service.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn TableStore>,
}

fn by_id(id: Uuid) -> Filter {
    Filter::eq("id", id.to_string())
}

fn to_row<T: Serialize>(table: Table, value: &T) -> StorageResult<Row> {
    match serde_json::to_value(value).map_err(|err| StorageError::encode(table, err))? {
        Value::Object(row) => Ok(row),
        other => {
            let reason = format!("expected an object, got {other}");
            Err(StorageError::encode(
                table,
                <serde_json::Error as serde::ser::Error>::custom(reason),
            ))
        }
    }
}

fn from_row<T: DeserializeOwned>(table: Table, row: Row) -> StorageResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|err| StorageError::decode(table, err))
}

fn from_rows<T: DeserializeOwned>(table: Table, rows: Vec<Row>) -> StorageResult<Vec<T>> {
    rows.into_iter().map(|row| from_row(table, row)).collect()
}

impl Repository {
    /// Wrap a table store.
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    async fn select<T: DeserializeOwned>(&self, query: Query) -> StorageResult<Vec<T>> {
        let table = query.table;
        let rows = self.store.select(query).await?;
        from_rows(table, rows)
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: Table,
        filters: Vec<Filter>,
    ) -> StorageResult<Option<T>> {
        let query = Query {
            filters,
            ..Query::from(table)
        }
        .limit(1);
        Ok(self.select(query).await?.into_iter().next())
    }

    async fn insert<V: Serialize, T: DeserializeOwned>(
        &self,
        table: Table,
        values: &V,
    ) -> StorageResult<T> {
        let row = self.store.insert(table, to_row(table, values)?).await?;
        from_row(table, row)
    }

    async fn update_by_id<P: Serialize, T: DeserializeOwned>(
        &self,
        table: Table,
        id: Uuid,
        patch: &P,
    ) -> StorageResult<Option<T>> {
        let rows = self
            .store
            .update(table, vec![by_id(id)], to_row(table, patch)?)
            .await?;
        Ok(from_rows(table, rows)?.into_iter().next())
    }

    async fn delete_by_id(&self, table: Table, id: Uuid) -> StorageResult<bool> {
        Ok(self.store.delete(table, vec![by_id(id)]).await? > 0)
    }

    // fields

    pub async fn list_fields(&self) -> StorageResult<Vec<FieldEntity>> {
        self.select(Query::from(Table::Fields).order_asc("name")).await
    }

    pub async fn find_field(&self, id: Uuid) -> StorageResult<Option<FieldEntity>> {
        self.select_one(Table::Fields, vec![by_id(id)]).await
    }

    pub async fn create_field(&self, values: &FieldValues) -> StorageResult<FieldEntity> {
        self.insert(Table::Fields, values).await
    }

    pub async fn update_field(
        &self,
        id: Uuid,
        values: &FieldValues,
    ) -> StorageResult<Option<FieldEntity>> {
        self.update_by_id(Table::Fields, id, values).await
    }

    pub async fn delete_field(&self, id: Uuid) -> StorageResult<bool> {
        self.delete_by_id(Table::Fields, id).await
    }

    // matches

    /// Matches ordered by kick-off, optionally only those starting at or after `from`.
    pub async fn list_matches(&self, from: Option<&str>) -> StorageResult<Vec<MatchEntity>> {
        let mut query = Query::from(Table::Matches).order_asc("starts_at");
        if let Some(from) = from {
            query = query.filter(Filter::gte("starts_at", from));
        }
        self.select(query).await
    }

    pub async fn find_match(&self, id: Uuid) -> StorageResult<Option<MatchEntity>> {
        self.select_one(Table::Matches, vec![by_id(id)]).await
    }

    pub async fn create_match(&self, values: &NewMatch) -> StorageResult<MatchEntity> {
        self.insert(Table::Matches, values).await
    }

    pub async fn update_match(
        &self,
        id: Uuid,
        patch: &MatchPatch,
    ) -> StorageResult<Option<MatchEntity>> {
        self.update_by_id(Table::Matches, id, patch).await
    }

    /// Delete a match together with its enrollments and games.
    pub async fn delete_match(&self, id: Uuid) -> StorageResult<bool> {
        let of_match = vec![Filter::eq("match_id", id.to_string())];
        self.store.delete(Table::Games, of_match.clone()).await?;
        self.store.delete(Table::Enrollments, of_match).await?;
        self.delete_by_id(Table::Matches, id).await
    }

    // enrollments

    /// Enrollments of a match in registration order.
    pub async fn list_enrollments(&self, match_id: Uuid) -> StorageResult<Vec<EnrollmentEntity>> {
        self.select(
            Query::from(Table::Enrollments)
                .filter(Filter::eq("match_id", match_id.to_string()))
                .order_asc("created_at"),
        )
        .await
    }

    pub async fn find_enrollment(&self, id: Uuid) -> StorageResult<Option<EnrollmentEntity>> {
        self.select_one(Table::Enrollments, vec![by_id(id)]).await
    }

    pub async fn find_player_enrollment(
        &self,
        match_id: Uuid,
        player_id: Uuid,
    ) -> StorageResult<Option<EnrollmentEntity>> {
        self.select_one(
            Table::Enrollments,
            vec![
                Filter::eq("match_id", match_id.to_string()),
                Filter::eq("player_id", player_id.to_string()),
            ],
        )
        .await
    }

    pub async fn create_enrollment(
        &self,
        values: &NewEnrollment,
    ) -> StorageResult<EnrollmentEntity> {
        self.insert(Table::Enrollments, values).await
    }

    pub async fn update_enrollment(
        &self,
        id: Uuid,
        patch: &EnrollmentPatch,
    ) -> StorageResult<Option<EnrollmentEntity>> {
        self.update_by_id(Table::Enrollments, id, patch).await
    }

    /// Move every player of `team` in the match to the bench.
    pub async fn bench_team(
        &self,
        match_id: Uuid,
        team: TeamId,
    ) -> StorageResult<Vec<EnrollmentEntity>> {
        let patch = EnrollmentPatch {
            team_assignment: Some(None),
            ..EnrollmentPatch::default()
        };
        let rows = self
            .store
            .update(
                Table::Enrollments,
                vec![
                    Filter::eq("match_id", match_id.to_string()),
                    Filter::eq("team_assignment", team),
                ],
                to_row(Table::Enrollments, &patch)?,
            )
            .await?;
        from_rows(Table::Enrollments, rows)
    }

    pub async fn delete_enrollment(&self, id: Uuid) -> StorageResult<bool> {
        self.delete_by_id(Table::Enrollments, id).await
    }

    // games

    /// Games of a match in the order they were recorded.
    pub async fn list_games(&self, match_id: Uuid) -> StorageResult<Vec<GameEntity>> {
        self.select(
            Query::from(Table::Games)
                .filter(Filter::eq("match_id", match_id.to_string()))
                .order_asc("created_at"),
        )
        .await
    }

    pub async fn find_game(&self, id: Uuid) -> StorageResult<Option<GameEntity>> {
        self.select_one(Table::Games, vec![by_id(id)]).await
    }

    pub async fn create_game(&self, values: &GameValues) -> StorageResult<GameEntity> {
        self.insert(Table::Games, values).await
    }

    pub async fn update_game(
        &self,
        id: Uuid,
        values: &GameValues,
    ) -> StorageResult<Option<GameEntity>> {
        self.update_by_id(Table::Games, id, values).await
    }

    pub async fn delete_game(&self, id: Uuid) -> StorageResult<bool> {
        self.delete_by_id(Table::Games, id).await
    }

    // profiles

    pub async fn find_profile(&self, id: Uuid) -> StorageResult<Option<ProfileEntity>> {
        self.select_one(Table::Profiles, vec![by_id(id)]).await
    }

    /// Profiles whose id is in `ids`; unknown ids are skipped.
    pub async fn list_profiles(&self, ids: &[Uuid]) -> StorageResult<Vec<ProfileEntity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(
            Query::from(Table::Profiles)
                .filter(Filter::is_in("id", ids.iter().map(Uuid::to_string))),
        )
        .await
    }

    pub async fn all_profiles(&self) -> StorageResult<Vec<ProfileEntity>> {
        self.select(Query::from(Table::Profiles)).await
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> StorageResult<Option<ProfileEntity>> {
        self.update_by_id(Table::Profiles, id, patch).await
    }

    /// Insert a raw profile row. Profiles normally come from the auth provider.
    pub async fn insert_profile(&self, profile: &ProfileEntity) -> StorageResult<ProfileEntity> {
        self.insert(Table::Profiles, profile).await
    }
}
