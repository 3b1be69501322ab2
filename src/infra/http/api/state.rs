use std::sync::Arc;

use crate::application::posts::PostService;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct ApiState {
    pub posts: Arc<PostService>,
    pub db: PostgresRepositories,
}
