use crate::model::{DepartmentId, DoctorId, RosterEntry, ShiftId};
use thiserror::Error;

/// Source du shift de reprise au 1er du mois.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Continuity {
    /// Dernier jour du mois précédent ; s'il est OFF, retour au shift de référence.
    #[default]
    LastDay,
    /// Dernier jour travaillé du mois précédent, avancé d'un cran par OFF qui le suit.
    LastWorkingDay,
}

/// Options de génération
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    pub continuity: Continuity,
    /// Interrompt le lot au premier médecin sans rotation résoluble.
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoAssignment,
    EmptyShiftSequence,
    UnresolvableRotation,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NoAssignment => "no-assignment",
            SkipReason::EmptyShiftSequence => "empty-shift-sequence",
            SkipReason::UnresolvableRotation => "unresolvable-rotation",
        }
    }
}

/// Médecin écarté d'une génération.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub doctor: DoctorId,
    pub department: DepartmentId,
    pub reason: SkipReason,
}

/// Résultat d'une génération mensuelle : entrées produites + médecins écartés.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub entries: Vec<RosterEntry>,
    pub skipped: Vec<Skipped>,
}

impl Generation {
    pub fn is_complete(&self) -> bool {
        self.skipped
            .iter()
            .all(|s| s.reason == SkipReason::NoAssignment)
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid month {0}: expected 0..=11")]
    InvalidMonth(u32),
    #[error("invalid week off day {0}: expected 0..=6")]
    InvalidWeekOff(u8),
    #[error("no resolvable starting shift for doctor {doctor} in department {department}")]
    UnresolvableRotation {
        doctor: DoctorId,
        department: DepartmentId,
    },
    #[error("department {0} has no shifts")]
    EmptyShiftSequence(DepartmentId),
    #[error("unknown department: {0}")]
    UnknownDepartment(String),
    #[error("unknown doctor: {0}")]
    UnknownDoctor(String),
    #[error("unknown shift: {0}")]
    UnknownShift(String),
    #[error("shift {shift} does not belong to department {department}")]
    ShiftDepartmentMismatch {
        shift: ShiftId,
        department: DepartmentId,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
