use super::{
    continuity, util, GenerateOptions, Generation, SchedError, SkipReason, Skipped, YearMonth,
};
use crate::model::{DepartmentId, Doctor, EntryStatus, Registry, RosterEntry, Shift};
use std::collections::BTreeSet;

pub(super) fn generate_month(
    registry: &Registry,
    target: YearMonth,
    departments: &[DepartmentId],
    opts: GenerateOptions,
) -> Result<Generation, SchedError> {
    let mut out = Generation::default();
    let departments: BTreeSet<DepartmentId> = departments.iter().copied().collect();

    for department in departments {
        let shifts = util::rotation_sequence(registry, department);
        let mut doctors: Vec<&Doctor> = registry.doctors_in(department).collect();
        doctors.sort_by_key(|d| d.id);

        for doctor in doctors {
            let Some(assignment) = registry.find_assignment(doctor.id, department) else {
                skip(&mut out, doctor, department, SkipReason::NoAssignment);
                continue;
            };

            if shifts.is_empty() {
                if opts.strict {
                    return Err(SchedError::EmptyShiftSequence(department));
                }
                skip(&mut out, doctor, department, SkipReason::EmptyShiftSequence);
                continue;
            }

            let start = match continuity::resolve_start_index(
                doctor,
                department,
                target,
                &shifts,
                Some(assignment),
                &registry.entries,
                opts.continuity,
            ) {
                Ok(idx) => idx,
                Err(err) if opts.strict => return Err(err),
                Err(_) => {
                    skip(&mut out, doctor, department, SkipReason::UnresolvableRotation);
                    continue;
                }
            };

            #[cfg(feature = "logging")]
            tracing::debug!(
                doctor = %doctor.id,
                department = %department,
                start_shift = %shifts[start].name,
                "generating month"
            );

            out.entries
                .extend(walk_month(doctor, department, target, &shifts, start));
        }
    }

    Ok(out)
}

/// Parcourt le mois jour par jour ; le curseur n'avance qu'après un jour de repos.
fn walk_month<'a>(
    doctor: &'a Doctor,
    department: DepartmentId,
    target: YearMonth,
    shifts: &'a [&'a Shift],
    start: usize,
) -> impl Iterator<Item = RosterEntry> + 'a {
    target.days().scan(start, move |cursor, date| {
        let off = util::weekday_from_sunday(date) == doctor.week_off_day;
        let (status, shift_id) = if off {
            let entry = (EntryStatus::Off, None);
            *cursor = (*cursor + 1) % shifts.len();
            entry
        } else {
            (EntryStatus::Work, Some(shifts[*cursor].id))
        };
        Some(RosterEntry {
            id: None,
            date,
            month: target.month(),
            year: target.year(),
            department_id: department,
            shift_id,
            doctor_id: doctor.id,
            status,
        })
    })
}

fn skip(out: &mut Generation, doctor: &Doctor, department: DepartmentId, reason: SkipReason) {
    #[cfg(feature = "logging")]
    tracing::warn!(
        doctor = %doctor.id,
        department = %department,
        reason = reason.as_str(),
        "doctor skipped"
    );
    out.skipped.push(Skipped {
        doctor: doctor.id,
        department,
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DoctorId, ShiftAssignment, ShiftId};

    fn registry() -> Registry {
        let mut r = Registry::default();
        for order in 0..3 {
            let (name, start, end) = Shift::preset(order).unwrap();
            r.shifts.push(
                Shift::new(ShiftId(order + 1), DepartmentId(1), name, order, start, end).unwrap(),
            );
        }
        r.doctors
            .push(Doctor::new(DoctorId(1), "A", DepartmentId(1), 3).unwrap());
        r.assignments.push(ShiftAssignment {
            doctor_id: DoctorId(1),
            department_id: DepartmentId(1),
            shift_id: ShiftId(1),
        });
        r
    }

    #[test]
    fn cursor_only_moves_on_week_off() {
        let r = registry();
        let feb = YearMonth::new(2026, 1).unwrap();
        let gen = generate_month(&r, feb, &[DepartmentId(1)], GenerateOptions::default()).unwrap();
        assert_eq!(gen.entries.len(), 28);
        let shifts: Vec<Option<u32>> = gen.entries.iter().map(|e| e.shift_id.map(|s| s.0)).collect();
        assert_eq!(&shifts[..8], &[Some(1), Some(1), Some(1), None, Some(2), Some(2), Some(2), Some(2)]);
    }

    #[test]
    fn duplicate_department_ids_do_not_duplicate_entries() {
        let r = registry();
        let feb = YearMonth::new(2026, 1).unwrap();
        let gen = generate_month(
            &r,
            feb,
            &[DepartmentId(1), DepartmentId(1)],
            GenerateOptions::default(),
        )
        .unwrap();
        assert_eq!(gen.entries.len(), 28);
    }

    #[test]
    fn strict_mode_aborts_on_unresolvable() {
        let mut r = registry();
        r.assignments[0].shift_id = ShiftId(42);
        let feb = YearMonth::new(2026, 1).unwrap();
        let opts = GenerateOptions {
            strict: true,
            ..GenerateOptions::default()
        };
        let err = generate_month(&r, feb, &[DepartmentId(1)], opts).unwrap_err();
        assert!(matches!(err, SchedError::UnresolvableRotation { .. }));
    }
}
