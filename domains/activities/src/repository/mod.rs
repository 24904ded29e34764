//! Repository implementations for the activities domain

pub mod attendance;
pub mod events;
pub mod games;
pub mod news;

use sqlx::{PgPool, Postgres, Transaction};

use clubdesk_common::RepositoryError;

pub use attendance::{AttendanceRepository, AttendanceStats, BulkAttendanceEntry};
pub use events::{EventChanges, EventRepository, NewEvent};
pub use games::{GameChanges, GameRepository, NewGame};
pub use news::{NewNews, NewsChanges, NewsRepository};

/// Combined repository access for the activities domain
#[derive(Clone)]
pub struct ActivitiesRepositories {
    pool: PgPool,
    pub games: GameRepository,
    pub events: EventRepository,
    pub attendance: AttendanceRepository,
    pub news: NewsRepository,
}

impl ActivitiesRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            games: GameRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            news: NewsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Map unique-constraint violations to `AlreadyExists`.
pub(crate) fn map_insert_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::AlreadyExists;
        }
    }
    RepositoryError::Connection(err)
}
