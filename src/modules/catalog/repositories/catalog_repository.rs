use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::catalog::models::{
    BusStop, Course, FeeHead, FeeStructure, FeeStructureLine,
};

/// Reference data read by invoice generation and edited by staff
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_course(&self, name: &str) -> Result<Course>;

    async fn find_course(&self, id: i64) -> Result<Option<Course>>;

    async fn create_fee_head(&self, name: &str, description: &str) -> Result<FeeHead>;

    async fn find_fee_head(&self, id: i64) -> Result<Option<FeeHead>>;

    async fn list_fee_heads(&self) -> Result<Vec<FeeHead>>;

    /// Insert a fee structure; an existing (course, fee head) pair must
    /// fail with `DuplicateStructure`
    async fn create_fee_structure(
        &self,
        course_id: i64,
        fee_head_id: i64,
        amount: Decimal,
        installments: i32,
    ) -> Result<FeeStructure>;

    async fn update_fee_structure(
        &self,
        id: i64,
        amount: Decimal,
        installments: i32,
    ) -> Result<FeeStructure>;

    async fn find_fee_structure(&self, id: i64) -> Result<Option<FeeStructure>>;

    /// Structures of a course joined with their fee heads, ordered by structure id
    async fn list_structures_for_course(&self, course_id: i64) -> Result<Vec<FeeStructureLine>>;

    async fn create_bus_stop(&self, name: &str, route: &str, monthly_fee: Decimal)
        -> Result<BusStop>;

    async fn find_bus_stop(&self, id: i64) -> Result<Option<BusStop>>;
}

/// MySQL implementation of [`CatalogRepository`]
pub struct MySqlCatalogRepository {
    pool: MySqlPool,
}

impl MySqlCatalogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for MySqlCatalogRepository {
    async fn create_course(&self, name: &str) -> Result<Course> {
        let result = sqlx::query("INSERT INTO courses (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to create course", e))?;

        Ok(Course {
            id: result.last_insert_id() as i64,
            name: name.to_string(),
        })
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>> {
        sqlx::query_as::<_, Course>("SELECT id, name FROM courses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to fetch course", e))
    }

    async fn create_fee_head(&self, name: &str, description: &str) -> Result<FeeHead> {
        let result = sqlx::query("INSERT INTO fee_heads (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to create fee head", e))?;

        Ok(FeeHead {
            id: result.last_insert_id() as i64,
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    async fn find_fee_head(&self, id: i64) -> Result<Option<FeeHead>> {
        sqlx::query_as::<_, FeeHead>("SELECT id, name, description FROM fee_heads WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to fetch fee head", e))
    }

    async fn list_fee_heads(&self) -> Result<Vec<FeeHead>> {
        sqlx::query_as::<_, FeeHead>("SELECT id, name, description FROM fee_heads ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to list fee heads", e))
    }

    async fn create_fee_structure(
        &self,
        course_id: i64,
        fee_head_id: i64,
        amount: Decimal,
        installments: i32,
    ) -> Result<FeeStructure> {
        let result = sqlx::query(
            r#"
            INSERT INTO fee_structures (course_id, fee_head_id, amount, installments)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(course_id)
        .bind(fee_head_id)
        .bind(amount)
        .bind(installments)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateStructure {
                        course_id,
                        fee_head_id,
                    };
                }
            }
            AppError::from_db("Failed to create fee structure", e)
        })?;

        Ok(FeeStructure {
            id: result.last_insert_id() as i64,
            course_id,
            fee_head_id,
            amount,
            installments,
        })
    }

    async fn update_fee_structure(
        &self,
        id: i64,
        amount: Decimal,
        installments: i32,
    ) -> Result<FeeStructure> {
        sqlx::query(
            r#"
            UPDATE fee_structures
            SET amount = ?, installments = ?
            WHERE id = ?
            "#,
        )
        .bind(amount)
        .bind(installments)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to update fee structure", e))?;

        // MySQL reports zero affected rows for an unchanged row, so existence
        // is decided by re-reading
        self.find_fee_structure(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Fee structure {} not found", id)))
    }

    async fn find_fee_structure(&self, id: i64) -> Result<Option<FeeStructure>> {
        sqlx::query_as::<_, FeeStructure>(
            r#"
            SELECT id, course_id, fee_head_id, amount, installments
            FROM fee_structures
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to fetch fee structure", e))
    }

    async fn list_structures_for_course(&self, course_id: i64) -> Result<Vec<FeeStructureLine>> {
        let rows = sqlx::query_as::<_, StructureLineRow>(
            r#"
            SELECT
                s.id, s.course_id, s.fee_head_id, s.amount, s.installments,
                h.name AS head_name, h.description AS head_description
            FROM fee_structures s
            JOIN fee_heads h ON h.id = s.fee_head_id
            WHERE s.course_id = ?
            ORDER BY s.id ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to list fee structures", e))?;

        Ok(rows.into_iter().map(FeeStructureLine::from).collect())
    }

    async fn create_bus_stop(
        &self,
        name: &str,
        route: &str,
        monthly_fee: Decimal,
    ) -> Result<BusStop> {
        let result =
            sqlx::query("INSERT INTO bus_stops (name, route, monthly_fee) VALUES (?, ?, ?)")
                .bind(name)
                .bind(route)
                .bind(monthly_fee)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::from_db("Failed to create bus stop", e))?;

        Ok(BusStop {
            id: result.last_insert_id() as i64,
            name: name.to_string(),
            route: route.to_string(),
            monthly_fee,
        })
    }

    async fn find_bus_stop(&self, id: i64) -> Result<Option<BusStop>> {
        sqlx::query_as::<_, BusStop>(
            "SELECT id, name, route, monthly_fee FROM bus_stops WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to fetch bus stop", e))
    }
}

/// Database row for the structure/fee head join
#[derive(sqlx::FromRow)]
struct StructureLineRow {
    id: i64,
    course_id: i64,
    fee_head_id: i64,
    amount: Decimal,
    installments: i32,
    head_name: String,
    head_description: String,
}

impl From<StructureLineRow> for FeeStructureLine {
    fn from(row: StructureLineRow) -> Self {
        FeeStructureLine {
            structure: FeeStructure {
                id: row.id,
                course_id: row.course_id,
                fee_head_id: row.fee_head_id,
                amount: row.amount,
                installments: row.installments,
            },
            fee_head: FeeHead {
                id: row.fee_head_id,
                name: row.head_name,
                description: row.head_description,
            },
        }
    }
}
