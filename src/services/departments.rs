use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::entities::department;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewDepartment {
    #[validate(length(min = 1, message = "Department name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub is_it_department: bool,
}

/// Reference data for the departments stock is issued to.
#[derive(Clone)]
pub struct DepartmentService {
    db: Arc<DatabaseConnection>,
}

impl DepartmentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<department::Model>, ServiceError> {
        let departments = department::Entity::find()
            .order_by_asc(department::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(departments)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<department::Model, ServiceError> {
        department::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Department {} not found", id)))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewDepartment) -> Result<department::Model, ServiceError> {
        let model = department::ActiveModel {
            name: Set(input.name),
            is_it_department: Set(input.is_it_department),
            ..Default::default()
        };
        let created = model.insert(&*self.db).await?;
        Ok(created)
    }
}
