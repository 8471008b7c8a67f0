#![forbid(unsafe_code)]
//! Roulement — génération de plannings mensuels de médecins par rotation de shifts.
//!
//! - Registre fichier (JSON), import/export CSV.
//! - Jour de repos hebdomadaire attribué en round-robin par service.
//! - Le shift avance d'un cran à chaque jour de repos, avec reprise d'un mois sur l'autre.
//! - Régénérer un mois remplace ses entrées, sans jamais les dupliquer.

pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;

pub use model::{
    Department, DepartmentId, Doctor, DoctorId, EntryId, EntryStatus, IdCounters, Registry,
    RosterEntry, Shift, ShiftAssignment, ShiftId,
};
pub use scheduler::{
    allocate_week_off, resolve_start_index, Continuity, GenerateOptions, Generation, SchedError,
    Scheduler, SkipReason, Skipped, YearMonth,
};
pub use storage::{JsonStorage, Storage};
