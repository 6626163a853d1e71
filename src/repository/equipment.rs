//! Equipment repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::{map_unique_violation, EquipmentStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{EquipmentChanges, EquipmentFilter},
        Equipment, NewEquipment,
    },
    pagination::PageRequest,
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// `LIKE` pattern matching `term` anywhere, with wildcards in `term` escaped
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl EquipmentStore for EquipmentRepository {
    /// List equipment, optionally filtered by serial number substring
    async fn list(
        &self,
        filter: &EquipmentFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Equipment>, i64)> {
        let pattern = filter.serial_number.as_deref().map(contains_pattern);

        let where_clause = if pattern.is_some() {
            r"WHERE deleted_at IS NULL AND serial_number LIKE $1 ESCAPE '\'"
        } else {
            "WHERE deleted_at IS NULL"
        };

        let count_q = format!("SELECT COUNT(*) FROM equipment {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(ref p) = pattern {
            count_builder = count_builder.bind(p);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "SELECT * FROM equipment {} ORDER BY id LIMIT {} OFFSET {}",
            where_clause,
            page.limit(),
            page.offset()
        );
        let mut builder = sqlx::query_as::<_, Equipment>(&select_q);
        if let Some(ref p) = pattern {
            builder = builder.bind(p);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    /// Get equipment by ID
    async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Check whether a live row other than `ignore_id` uses the serial number
    async fn serial_number_taken(
        &self,
        serial_number: &str,
        ignore_id: Option<i32>,
    ) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM equipment
                WHERE serial_number = $1
                  AND deleted_at IS NULL
                  AND ($2::int IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(serial_number)
        .bind(ignore_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Create new equipment
    async fn create(&self, data: &NewEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (equipment_type_id, serial_number, remark)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.equipment_type_id)
        .bind(&data.serial_number)
        .bind(&data.remark)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                format!("Serial number {} already exists", data.serial_number)
            })
        })
    }

    /// Update the supplied fields of existing equipment
    async fn update(&self, id: i32, changes: &EquipmentChanges) -> AppResult<Equipment> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(changes.equipment_type_id, "equipment_type_id");
        add_field!(changes.serial_number, "serial_number");
        add_field!(changes.remark, "remark");

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} AND deleted_at IS NULL RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(changes.equipment_type_id);
        bind_field!(changes.serial_number);
        bind_field!(changes.remark);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, || {
                    format!("Serial number already exists (equipment {})", id)
                })
            })?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Soft delete equipment
    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE equipment SET deleted_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }
}
