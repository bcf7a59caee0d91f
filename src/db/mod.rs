//! Database layer: record types, the partial-update SQL compiler, and one
//! resource manager per entity over a shared Postgres pool.

pub mod health_journals;
pub mod medication_history;
pub mod models;
pub mod sql;
pub mod users;

pub use health_journals::HealthJournalStore;
pub use medication_history::MedicationHistoryStore;
pub use models::{HealthJournal, MedicationHistory, NewMedicationHistory, NewUser, User, UserDetail};
pub use sql::{sql_for_partial_update, ColumnMap, PartialUpdate, SqlValue, UpdateData};
pub use users::UserStore;
