//! SQLite-backed learning store.
//!
//! Identities live in the `state` and `action` tables, each with a uniqueness
//! constraint over the full encoding; values live in `q`, unique per
//! `(state_id, action_id)`. Everything is loaded once at open into an
//! in-memory working copy; writes go to SQLite first (autocommit), then to the
//! working copy.

use std::{
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

use super::tables::IdentityTable;
use crate::{
    Error, Result,
    codec::{ActionEncoding, ExternalFeatures, StateEncoding},
    identifiers::{ActionId, CardId, StateId},
    model::{ActionKind, Status, Target},
    ports::{IdentityStore, ValueMap, ValueStore},
    value::ValueCache,
};

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS state (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    turn INTEGER NOT NULL,
    hand TEXT NOT NULL,
    status TEXT NOT NULL,
    own_health INTEGER NOT NULL,
    own_health_deficit INTEGER NOT NULL,
    own_resource INTEGER NOT NULL,
    own_max_resource INTEGER NOT NULL,
    left_health INTEGER NOT NULL,
    left_health_deficit INTEGER NOT NULL,
    left_resource INTEGER NOT NULL,
    left_max_resource INTEGER NOT NULL,
    right_health INTEGER NOT NULL,
    right_health_deficit INTEGER NOT NULL,
    right_resource INTEGER NOT NULL,
    right_max_resource INTEGER NOT NULL,
    UNIQUE (
        turn, hand, status,
        own_health, own_health_deficit, own_resource, own_max_resource,
        left_health, left_health_deficit, left_resource, left_max_resource,
        right_health, right_health_deficit, right_resource, right_max_resource
    )
);

CREATE TABLE IF NOT EXISTS action (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    card_id INTEGER NOT NULL,
    target TEXT NOT NULL,
    UNIQUE (kind, card_id, target)
);

CREATE TABLE IF NOT EXISTS q (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    state_id INTEGER NOT NULL,
    action_id INTEGER NOT NULL,
    q REAL NOT NULL,
    UNIQUE (state_id, action_id),
    FOREIGN KEY (state_id) REFERENCES state(id),
    FOREIGN KEY (action_id) REFERENCES action(id)
);
";

const STATE_COLUMNS: &str = "turn, hand, status, \
    own_health, own_health_deficit, own_resource, own_max_resource, \
    left_health, left_health_deficit, left_resource, left_max_resource, \
    right_health, right_health_deficit, right_resource, right_max_resource";

// `card_id` and `target` use sentinels instead of NULL so the UNIQUE
// constraint also covers actions without a card or target.
const NO_CARD: i64 = -1;
const NO_TARGET: &str = "";

struct Tables {
    conn: Connection,
    states: IdentityTable<StateEncoding>,
    actions: IdentityTable<ActionEncoding>,
    values: ValueCache,
}

/// Durable store for training runs.
///
/// # Examples
///
/// ```no_run
/// use simdyna::adapters::SqliteStore;
/// use simdyna::ports::ValueStore;
///
/// let store = SqliteStore::open("data/values.db")?;
/// println!("{} values loaded", store.value_count());
/// # Ok::<(), simdyna::Error>(())
/// ```
pub struct SqliteStore {
    tables: Mutex<Tables>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and load it into memory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                operation: format!("create database directory {parent:?}"),
                source,
            })?;
        }
        let conn = Connection::open(path).map_err(Error::store(format!("open {path:?}")))?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory SQLite database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(Error::store("open in-memory database"))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(Error::store("create schema"))?;

        let states = load_states(&conn)?;
        let actions = load_actions(&conn)?;
        let mut values = ValueCache::new();
        for (state, action, value) in load_values(&conn)? {
            values.upsert(state, action, value);
        }
        info!(
            states = states.len(),
            actions = actions.len(),
            values = values.len(),
            "loaded value store"
        );

        Ok(Self {
            tables: Mutex::new(Tables {
                conn,
                states,
                actions,
                values,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn row_id(raw: i64, table: &str) -> Result<u64> {
    u64::try_from(raw).map_err(|_| Error::CorruptRecord {
        table: table.to_string(),
        id: raw,
        message: "negative row id".to_string(),
    })
}

fn corrupt(table: &str, id: i64) -> impl FnOnce(Error) -> Error + '_ {
    move |err| Error::CorruptRecord {
        table: table.to_string(),
        id,
        message: err.to_string(),
    }
}

fn read_features(row: &Row<'_>, offset: usize) -> rusqlite::Result<ExternalFeatures> {
    Ok(ExternalFeatures {
        health: row.get(offset)?,
        health_deficit: row.get(offset + 1)?,
        resource: row.get(offset + 2)?,
        max_resource: row.get(offset + 3)?,
    })
}

fn load_states(conn: &Connection) -> Result<IdentityTable<StateEncoding>> {
    let mut stmt = conn
        .prepare(&format!("SELECT id, {STATE_COLUMNS} FROM state ORDER BY id"))
        .map_err(Error::store("prepare state load"))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                read_features(row, 4)?,
                read_features(row, 8)?,
                read_features(row, 12)?,
            ))
        })
        .map_err(Error::store("load states"))?;

    let mut table = IdentityTable::new();
    for row in rows {
        let (id, turn, hand, status, own, left, right) = row.map_err(Error::store("read state row"))?;
        let encoding = StateEncoding {
            turn,
            hand: StateEncoding::parse_hand(&hand).map_err(corrupt("state", id))?,
            status: status.parse::<Status>().map_err(corrupt("state", id))?,
            own,
            left,
            right,
        };
        table.insert(row_id(id, "state")?, encoding);
    }
    Ok(table)
}

fn load_actions(conn: &Connection) -> Result<IdentityTable<ActionEncoding>> {
    let mut stmt = conn
        .prepare("SELECT id, kind, card_id, target FROM action ORDER BY id")
        .map_err(Error::store("prepare action load"))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(Error::store("load actions"))?;

    let mut table = IdentityTable::new();
    for row in rows {
        let (id, kind, card, target) = row.map_err(Error::store("read action row"))?;
        let card = match card {
            NO_CARD => None,
            raw => Some(CardId::new(u32::try_from(raw).map_err(|_| {
                Error::CorruptRecord {
                    table: "action".to_string(),
                    id,
                    message: format!("card id {raw} out of range"),
                }
            })?)),
        };
        let target = match target.as_str() {
            NO_TARGET => None,
            tag => Some(tag.parse::<Target>().map_err(corrupt("action", id))?),
        };
        let encoding = ActionEncoding {
            kind: kind.parse::<ActionKind>().map_err(corrupt("action", id))?,
            card,
            target,
        };
        table.insert(row_id(id, "action")?, encoding);
    }
    Ok(table)
}

fn load_values(conn: &Connection) -> Result<Vec<(StateId, ActionId, f64)>> {
    let mut stmt = conn
        .prepare("SELECT state_id, action_id, q FROM q ORDER BY id")
        .map_err(Error::store("prepare value load"))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })
        .map_err(Error::store("load values"))?;

    let mut values = Vec::new();
    for row in rows {
        let (state, action, value) = row.map_err(Error::store("read value row"))?;
        values.push((
            StateId::new(row_id(state, "q")?),
            ActionId::new(row_id(action, "q")?),
            value,
        ));
    }
    Ok(values)
}

fn insert_state(conn: &Connection, e: &StateEncoding) -> rusqlite::Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO state ({STATE_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            e.turn,
            e.hand_key(),
            e.status.as_str(),
            e.own.health,
            e.own.health_deficit,
            e.own.resource,
            e.own.max_resource,
            e.left.health,
            e.left.health_deficit,
            e.left.resource,
            e.left.max_resource,
            e.right.health,
            e.right.health_deficit,
            e.right.resource,
            e.right.max_resource,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_action(conn: &Connection, e: &ActionEncoding) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO action (kind, card_id, target) VALUES (?1, ?2, ?3)",
        params![
            e.kind.as_str(),
            e.card.map_or(NO_CARD, |card| i64::from(card.value())),
            e.target.map_or(NO_TARGET, |target| target.as_str()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl IdentityStore for SqliteStore {
    fn intern_state(&self, encoding: &StateEncoding) -> Result<StateId> {
        let mut tables = self.lock();
        if let Some(id) = tables.states.lookup(encoding) {
            return Ok(StateId::new(id));
        }
        let raw = insert_state(&tables.conn, encoding).map_err(Error::store("insert state"))?;
        let id = row_id(raw, "state")?;
        tables.states.insert(id, encoding.clone());
        debug!(state = id, "allocated state identity");
        Ok(StateId::new(id))
    }

    fn intern_action(&self, encoding: &ActionEncoding) -> Result<ActionId> {
        let mut tables = self.lock();
        if let Some(id) = tables.actions.lookup(encoding) {
            return Ok(ActionId::new(id));
        }
        let raw = insert_action(&tables.conn, encoding).map_err(Error::store("insert action"))?;
        let id = row_id(raw, "action")?;
        tables.actions.insert(id, *encoding);
        debug!(action = id, "allocated action identity");
        Ok(ActionId::new(id))
    }

    fn state_encoding(&self, id: StateId) -> Result<Option<StateEncoding>> {
        Ok(self.lock().states.get(id.value()).cloned())
    }

    fn action_encoding(&self, id: ActionId) -> Result<Option<ActionEncoding>> {
        Ok(self.lock().actions.get(id.value()).copied())
    }

    fn state_count(&self) -> usize {
        self.lock().states.len()
    }

    fn action_count(&self) -> usize {
        self.lock().actions.len()
    }
}

impl ValueStore for SqliteStore {
    fn get(&self, state: StateId, action: ActionId) -> Option<f64> {
        self.lock().values.get(state, action)
    }

    fn upsert(&self, state: StateId, action: ActionId, value: f64) -> Result<()> {
        let mut tables = self.lock();
        tables
            .conn
            .execute(
                "INSERT INTO q (state_id, action_id, q) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (state_id, action_id) DO UPDATE SET q = excluded.q",
                params![state.value() as i64, action.value() as i64, value],
            )
            .map_err(Error::store(format!("upsert value ({state}, {action})")))?;
        tables.values.upsert(state, action, value);
        Ok(())
    }

    fn load_all(&self) -> Result<ValueMap> {
        let tables = self.lock();
        let mut map = ValueMap::new();
        for (state, action, value) in load_values(&tables.conn)? {
            map.entry(state).or_default().insert(action, value);
        }
        Ok(map)
    }

    fn has_any_value_for(&self, state: StateId) -> bool {
        self.lock().values.has_any(state)
    }

    fn action_values(&self, state: StateId) -> Vec<(ActionId, f64)> {
        self.lock().values.action_values(state)
    }

    fn recorded_state_count(&self) -> usize {
        self.lock().values.recorded_len()
    }

    fn recorded_state(&self, index: usize) -> Option<StateId> {
        self.lock().values.recorded_at(index)
    }

    fn value_count(&self) -> usize {
        self.lock().values.len()
    }
}
