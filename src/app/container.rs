//! Dependency injection container.
//!
//! The container owns the infrastructure (learning store, snapshot format,
//! card catalog) and hands it to the domain objects it creates.

use std::{path::Path, sync::Arc};

use super::config::AgentConfig;
use crate::{
    Result,
    adapters::{InMemoryStore, MsgPackSnapshotRepository, SqliteStore},
    agent::LearningAgent,
    codec::IdentityCodec,
    identifiers::Seat,
    model::CardCatalog,
    ports::{LearningStore, SharedStore, SnapshotRepository},
    value::ValueSnapshot,
};

/// Application with dependency injection.
///
/// Every agent created by one `App` is bound to the same store.
///
/// # Examples
///
/// ## Production usage
///
/// ```no_run
/// use simdyna::app::{AgentConfig, App};
/// use simdyna::identifiers::Seat;
///
/// let app = App::open("data/values.db")?;
/// let agent = app.create_agent(Seat::new(0), AgentConfig::default())?;
/// # Ok::<(), simdyna::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use simdyna::adapters::InMemoryStore;
/// use simdyna::app::App;
///
/// let app = App::for_testing()
///     .with_store(InMemoryStore::new())
///     .with_default_seed(42)
///     .build();
/// ```
#[derive(Clone)]
pub struct App {
    store: SharedStore,
    catalog: Arc<CardCatalog>,
    snapshot_repository: Arc<dyn SnapshotRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// App backed by the SQLite database at `path`, with the standard card
    /// catalog and MessagePack snapshots.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(AppBuilder::new()
            .with_store(SqliteStore::open(path)?)
            .build())
    }

    /// App backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        AppBuilder::new().build()
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    pub fn catalog(&self) -> Arc<CardCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }

    pub fn identity_codec(&self) -> IdentityCodec {
        IdentityCodec::new(self.store(), self.catalog())
    }

    /// Create an agent for `seat` bound to the app's store.
    ///
    /// The config seed takes precedence over the app default.
    pub fn create_agent(&self, seat: Seat, mut config: AgentConfig) -> Result<LearningAgent> {
        if config.seed.is_none() {
            config.seed = self.default_seed;
        }
        LearningAgent::new(seat, config, self.store(), self.catalog())
    }

    /// Capture the current value table.
    pub fn snapshot(&self) -> Result<ValueSnapshot> {
        ValueSnapshot::capture(self.store.as_ref())
    }

    /// Write a snapshot of the value table to `path`.
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        self.snapshot_repository.save(&self.snapshot()?, path)
    }

    /// Read a snapshot written by [`save_snapshot`](Self::save_snapshot)
    /// into a new in-memory store.
    pub fn load_snapshot(&self, path: &Path) -> Result<InMemoryStore> {
        InMemoryStore::from_snapshot(&self.snapshot_repository.load(path)?)
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Unset dependencies default to an [`InMemoryStore`], the standard card
/// catalog and [`MsgPackSnapshotRepository`].
pub struct AppBuilder {
    store: Option<SharedStore>,
    catalog: Option<Arc<CardCatalog>>,
    snapshot_repository: Option<Arc<dyn SnapshotRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            catalog: None,
            snapshot_repository: None,
            default_seed: None,
        }
    }

    pub fn with_store<S: LearningStore + 'static>(mut self, store: S) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Use an already shared store, e.g. to inspect it from a test.
    pub fn with_shared_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_catalog(mut self, catalog: CardCatalog) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn with_snapshot_repository<R: SnapshotRepository + Send + Sync + 'static>(
        mut self,
        repo: R,
    ) -> Self {
        self.snapshot_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for all agents created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    pub fn build(self) -> App {
        App {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryStore::new())),
            catalog: self
                .catalog
                .unwrap_or_else(|| Arc::new(CardCatalog::standard())),
            snapshot_repository: self
                .snapshot_repository
                .unwrap_or_else(|| Arc::new(MsgPackSnapshotRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentPhase;

    #[test]
    fn test_app_creates_agent() {
        let app = App::in_memory();
        let agent = app.create_agent(Seat::new(1), AgentConfig::default()).unwrap();
        assert_eq!(agent.seat(), Seat::new(1));
        assert_eq!(agent.phase(), AgentPhase::Uninitialized);
    }

    #[test]
    fn test_app_applies_default_seed() {
        let app = App::for_testing().with_default_seed(42).build();
        let agent = app.create_agent(Seat::new(0), AgentConfig::default()).unwrap();
        assert_eq!(agent.config().seed, Some(42));
    }

    #[test]
    fn test_config_seed_overrides_app_default() {
        let app = App::for_testing().with_default_seed(42).build();
        let agent = app
            .create_agent(Seat::new(0), AgentConfig::default().with_seed(123))
            .unwrap();
        assert_eq!(agent.config().seed, Some(123));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let app = App::in_memory();
        let config = AgentConfig::default().with_discount_factor(3.0);
        assert!(app.create_agent(Seat::new(0), config).is_err());
    }
}
