pub mod gateway;
pub mod model;
pub mod repository;

pub use gateway::{NotesGateway, NOTES_KEY};
pub use model::{
    materialize, materialize_at, parse_timestamp, EncounterDraft, EncounterRecord,
    EncounterStatus, UnknownStatus, ValidationError,
};
pub use repository::{NotesRepository, Snapshot};

/// Sort newest first by timestamp. Records whose timestamp does not parse
/// go last, keeping their relative order.
pub fn sort_recent_first(records: &mut [EncounterRecord]) {
    records.sort_by(|a, b| b.recorded_at().cmp(&a.recorded_at()));
}
