use crate::model::{DepartmentId, Doctor};

/// Lundi, mercredi, vendredi, dimanche, mardi, jeudi, samedi.
pub const WEEK_OFF_CYCLE: [u8; 7] = [1, 3, 5, 0, 2, 4, 6];

/// Jour de repos du prochain médecin inscrit dans `department` :
/// fonction pure de l'effectif courant du service.
pub fn allocate_week_off(existing: &[Doctor], department: DepartmentId) -> u8 {
    let headcount = existing
        .iter()
        .filter(|d| d.department_id == department)
        .count();
    WEEK_OFF_CYCLE[headcount % WEEK_OFF_CYCLE.len()]
}
