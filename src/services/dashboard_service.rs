// src/services/dashboard_service.rs

use chrono::Utc;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, db::DashboardRepository, models::dashboard::DashboardSummary};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary<'e, E>(&self, executor: E, user_id: Uuid) -> Result<DashboardSummary, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let today = Utc::now().date_naive();
        self.repo.get_summary(executor, user_id, today).await
    }
}
