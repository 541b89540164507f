use std::sync::Arc;

use crate::{
    cj::CjClient,
    config::AppConfig,
    db::{DbPool, OrmConn, orm_from_pool},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub cj: CjClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, cj: CjClient, config: AppConfig) -> Self {
        let orm = orm_from_pool(&pool);
        Self {
            pool,
            orm,
            cj,
            config: Arc::new(config),
        }
    }
}
