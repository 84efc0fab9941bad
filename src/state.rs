use std::sync::Arc;

use crate::db::OrmConn;

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub jwt_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(orm: OrmConn, jwt_secret: Option<String>) -> Self {
        Self {
            orm,
            jwt_secret: jwt_secret.map(Arc::from),
        }
    }
}
