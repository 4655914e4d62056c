//! Self-contained export of a learned value table.

use std::{
    collections::{HashMap, HashSet},
    io::Write,
};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    codec::{ActionEncoding, StateEncoding},
    identifiers::{ActionId, StateId},
    ports::LearningStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub state: StateId,
    pub action: ActionId,
    pub value: f64,
}

/// Every value entry together with the encodings its identities refer to.
///
/// States without values are not captured; they carry no learned
/// information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSnapshot {
    pub version: u32,
    pub states: Vec<(StateId, StateEncoding)>,
    pub actions: Vec<(ActionId, ActionEncoding)>,
    pub values: Vec<ValueEntry>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    state_id: u64,
    state: &'a str,
    action_id: u64,
    action: &'a str,
    value: f64,
}

impl ValueSnapshot {
    pub const VERSION: u32 = 1;

    /// Capture the current contents of `store`.
    pub fn capture(store: &dyn LearningStore) -> Result<Self> {
        let mut states = Vec::new();
        let mut actions = Vec::new();
        let mut values = Vec::new();
        let mut seen_actions = HashSet::new();

        for index in 0..store.recorded_state_count() {
            let Some(state) = store.recorded_state(index) else {
                break;
            };
            let encoding = store.state_encoding(state)?.ok_or_else(|| Error::CorruptRecord {
                table: "state".to_string(),
                id: state.value() as i64,
                message: "value entry references an unallocated state".to_string(),
            })?;
            states.push((state, encoding));

            for (action, value) in store.action_values(state) {
                if seen_actions.insert(action) {
                    let encoding =
                        store
                            .action_encoding(action)?
                            .ok_or_else(|| Error::CorruptRecord {
                                table: "action".to_string(),
                                id: action.value() as i64,
                                message: "value entry references an unallocated action"
                                    .to_string(),
                            })?;
                    actions.push((action, encoding));
                }
                values.push(ValueEntry {
                    state,
                    action,
                    value,
                });
            }
        }

        Ok(Self {
            version: Self::VERSION,
            states,
            actions,
            values,
        })
    }

    /// Reject snapshots written by an incompatible version.
    pub fn check_version(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(Error::SerializationContext {
                operation: "read value snapshot".to_string(),
                message: format!(
                    "unsupported snapshot version {}, expected {}",
                    self.version,
                    Self::VERSION
                ),
            });
        }
        Ok(())
    }

    /// Write one CSV row per value entry with human-readable encodings.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let states: HashMap<_, _> =
            self.states.iter().map(|(id, e)| (*id, e.to_string())).collect();
        let actions: HashMap<_, _> =
            self.actions.iter().map(|(id, e)| (*id, e.to_string())).collect();

        let mut csv = csv::Writer::from_writer(writer);
        for entry in &self.values {
            csv.serialize(CsvRow {
                state_id: entry.state.value(),
                state: states.get(&entry.state).map_or("", String::as_str),
                action_id: entry.action.value(),
                action: actions.get(&entry.action).map_or("", String::as_str),
                value: entry.value,
            })?;
        }
        csv.flush()?;
        Ok(())
    }
}
