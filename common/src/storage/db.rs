use crate::error::AppError;

use super::types::StoredObject;
use include_dir::{include_dir, Dir};
use std::ops::Deref;
use surrealdb::{
    engine::any::{connect, Any},
    opt::auth::Root,
    Error, Surreal,
};
use tracing::{debug, info};

/// Schema scripts, embedded at compile time and applied in file name order.
static SCHEMA_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/db/schema");

#[derive(Clone)]
pub struct SurrealDbClient {
    pub client: Surreal<Any>,
}

impl SurrealDbClient {
    /// # Initialize a new database client
    ///
    /// Connects to `address`, signs in as root and selects the namespace and
    /// database. The returned client multiplexes one connection and is cheap
    /// to clone per request.
    pub async fn new(
        address: &str,
        username: &str,
        password: &str,
        namespace: &str,
        database: &str,
    ) -> Result<Self, Error> {
        let db = connect(address).await?;

        // Sign in to database
        db.signin(Root { username, password }).await?;

        // Set namespace
        db.use_ns(namespace).use_db(database).await?;

        info!(address, namespace, database, "Connected to SurrealDB");

        Ok(SurrealDbClient { client: db })
    }

    /// Applies every embedded `.surql` script in file name order.
    ///
    /// Scripts only use `IF NOT EXISTS` definitions, so running this on every
    /// startup is safe.
    pub async fn apply_migrations(&self) -> Result<(), AppError> {
        let mut scripts: Vec<_> = SCHEMA_DIR
            .files()
            .filter(|file| file.path().extension().is_some_and(|ext| ext == "surql"))
            .collect();
        scripts.sort_by_key(|file| file.path());

        for file in scripts {
            let path = file.path().display();
            let script = file.contents_utf8().ok_or_else(|| {
                AppError::InternalError(format!("Schema script {path} is not valid UTF-8"))
            })?;

            debug!(script = %path, "Applying schema script");
            self.client.query(script).await?.check()?;
        }

        info!("Database schema is up to date");
        Ok(())
    }

    /// Runs a trivial query to confirm the database is reachable.
    pub async fn ping(&self) -> Result<(), Error> {
        self.client.query("RETURN true").await?.check()?;
        Ok(())
    }

    /// Operation to store a object in SurrealDB, requires the struct to implement StoredObject
    ///
    /// The record key is taken from `get_id`, so storing two objects with the
    /// same id fails atomically in the database.
    ///
    /// # Returns
    /// * `Result` - Item or Error
    pub async fn store_item<T>(&self, item: T) -> Result<Option<T>, Error>
    where
        T: StoredObject + Send + Sync + 'static,
    {
        self.client
            .create((T::table_name(), item.get_id()))
            .content(item)
            .await
    }

    /// Operation to retrieve a single object by its ID, requires the struct to implement StoredObject
    ///
    /// # Returns
    /// * `Result<Option<T>, Error>` - The found item or Error
    pub async fn get_item<T>(&self, id: &str) -> Result<Option<T>, Error>
    where
        T: for<'de> StoredObject,
    {
        self.client.select((T::table_name(), id)).await
    }
}

impl Deref for SurrealDbClient {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl SurrealDbClient {
    /// Create an in-memory SurrealDB client for testing.
    pub async fn memory(namespace: &str, database: &str) -> Result<Self, Error> {
        let db = connect("mem://").await?;

        db.use_ns(namespace).use_db(database).await?;

        Ok(SurrealDbClient { client: db })
    }
}
