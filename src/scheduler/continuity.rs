use super::{util, Continuity, SchedError, YearMonth};
use crate::model::{DepartmentId, Doctor, RosterEntry, Shift, ShiftAssignment};

/// Position dans `shifts` à laquelle `doctor` reprend le 1er de `target`.
///
/// Historique du mois précédent d'abord, shift de référence ensuite ; un
/// shift absent de la séquence n'est jamais ramené à l'index 0.
pub fn resolve_start_index(
    doctor: &Doctor,
    department: DepartmentId,
    target: YearMonth,
    shifts: &[&Shift],
    baseline: Option<&ShiftAssignment>,
    prior_entries: &[RosterEntry],
    continuity: Continuity,
) -> Result<usize, SchedError> {
    let unresolvable = || SchedError::UnresolvableRotation {
        doctor: doctor.id,
        department,
    };

    if shifts.is_empty() {
        return Err(unresolvable());
    }

    let mut previous: Vec<&RosterEntry> = match target.previous() {
        Some(prev) => prior_entries
            .iter()
            .filter(|e| {
                e.doctor_id == doctor.id
                    && e.department_id == department
                    && e.month == prev.month()
                    && e.year == prev.year()
            })
            .collect(),
        None => Vec::new(),
    };
    previous.sort_by_key(|e| e.date);

    let from_history = match continuity {
        Continuity::LastDay => previous
            .last()
            .and_then(|last| last.shift_id)
            .and_then(|id| util::position_of(shifts, id)),
        Continuity::LastWorkingDay => resume_after_last_working_day(&previous, shifts),
    };

    from_history
        .or_else(|| baseline.and_then(|a| util::position_of(shifts, a.shift_id)))
        .ok_or_else(unresolvable)
}

/// Curseur de fin du mois précédent : position du dernier jour travaillé,
/// avancée d'un cran par jour OFF qui le suit.
fn resume_after_last_working_day(previous: &[&RosterEntry], shifts: &[&Shift]) -> Option<usize> {
    let (pos, last_work) = previous
        .iter()
        .enumerate()
        .rev()
        .find_map(|(pos, e)| e.shift_id.filter(|_| !e.is_off()).map(|id| (pos, id)))?;
    let index = util::position_of(shifts, last_work)?;
    let offs_after = previous[pos + 1..].iter().filter(|e| e.is_off()).count();
    Some((index + offs_after) % shifts.len())
}
