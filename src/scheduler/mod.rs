mod continuity;
mod generate;
mod types;
mod util;
mod week_off;

pub use continuity::resolve_start_index;
pub use types::{Continuity, GenerateOptions, Generation, SchedError, SkipReason, Skipped};
pub use util::{weekday_name, YearMonth, WEEKDAY_NAMES};
pub use week_off::{allocate_week_off, WEEK_OFF_CYCLE};

use crate::model::{
    Department, DepartmentId, Doctor, DoctorId, Registry, Shift, ShiftAssignment, ShiftId,
};
use chrono::NaiveTime;

/// Scheduler : encapsule le registre et expose le moteur de rotation.
#[derive(Debug, Default)]
pub struct Scheduler {
    registry: Registry,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            registry: Registry::default(),
        }
    }

    pub fn from_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }
    pub fn into_registry(self) -> Registry {
        self.registry
    }

    pub fn add_department(&mut self, name: &str) -> DepartmentId {
        let id = self.registry.next_department_id();
        self.registry.departments.push(Department {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn add_shift(
        &mut self,
        department: DepartmentId,
        name: &str,
        order: u32,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<ShiftId, SchedError> {
        self.require_department(department)?;
        let id = self.registry.next_shift_id();
        let shift = Shift::new(id, department, name, order, start, end).map_err(anyhow::Error::msg)?;
        self.registry.shifts.push(shift);
        Ok(id)
    }

    /// Shift standard (Morning/Evening/Night) pour la position `order`.
    pub fn add_preset_shift(
        &mut self,
        department: DepartmentId,
        order: u32,
    ) -> Result<ShiftId, SchedError> {
        let (name, start, end) = Shift::preset(order)
            .ok_or_else(|| anyhow::anyhow!("no preset shift for order {order}"))?;
        self.add_shift(department, name, order, start, end)
    }

    /// Supprime un shift ; les assignations qui le référencent deviennent irrésolubles.
    pub fn remove_shift(&mut self, id: ShiftId) -> Result<Shift, SchedError> {
        let pos = self
            .registry
            .shifts
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SchedError::UnknownShift(id.to_string()))?;
        Ok(self.registry.shifts.remove(pos))
    }

    /// Inscrit un médecin. Sans jour de repos explicite, il est attribué
    /// par `allocate_week_off` selon l'effectif du service.
    pub fn register_doctor(
        &mut self,
        name: &str,
        department: DepartmentId,
        week_off: Option<u8>,
    ) -> Result<DoctorId, SchedError> {
        self.require_department(department)?;
        let day = week_off.unwrap_or_else(|| allocate_week_off(&self.registry.doctors, department));
        let id = self.registry.next_doctor_id();
        let doctor =
            Doctor::new(id, name, department, day).map_err(|_| SchedError::InvalidWeekOff(day))?;
        self.registry.doctors.push(doctor);
        Ok(id)
    }

    /// Supprime un médecin et ses assignations ; ses entrées passées sont conservées.
    pub fn remove_doctor(&mut self, id: DoctorId) -> Result<Doctor, SchedError> {
        let pos = self
            .registry
            .doctors
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| SchedError::UnknownDoctor(id.to_string()))?;
        self.registry.assignments.retain(|a| a.doctor_id != id);
        Ok(self.registry.doctors.remove(pos))
    }

    /// Pose le shift de référence d'un médecin ; remplace l'assignation existante
    /// pour le même couple (médecin, service).
    pub fn assign_shift(
        &mut self,
        doctor: DoctorId,
        department: DepartmentId,
        shift: ShiftId,
    ) -> Result<(), SchedError> {
        self.require_department(department)?;
        if self.registry.find_doctor(doctor).is_none() {
            return Err(SchedError::UnknownDoctor(doctor.to_string()));
        }
        let owner = self
            .registry
            .find_shift(shift)
            .map(|s| s.department_id)
            .ok_or_else(|| SchedError::UnknownShift(shift.to_string()))?;
        if owner != department {
            return Err(SchedError::ShiftDepartmentMismatch { shift, department });
        }

        self.registry
            .assignments
            .retain(|a| !(a.doctor_id == doctor && a.department_id == department));
        self.registry.assignments.push(ShiftAssignment {
            doctor_id: doctor,
            department_id: department,
            shift_id: shift,
        });
        Ok(())
    }

    /// Calcule le planning d'un mois (0 = janvier) sans toucher au registre.
    pub fn generate_month(
        &self,
        month: u32,
        year: i32,
        departments: &[DepartmentId],
        opts: GenerateOptions,
    ) -> Result<Generation, SchedError> {
        let target = YearMonth::new(year, month)?;
        generate::generate_month(&self.registry, target, departments, opts)
    }

    /// Génère puis remplace les entrées du mois pour chaque médecin des services
    /// demandés ; un médecin écarté perd ses anciennes entrées du mois.
    pub fn regenerate_month(
        &mut self,
        month: u32,
        year: i32,
        departments: &[DepartmentId],
        opts: GenerateOptions,
    ) -> Result<Generation, SchedError> {
        let generation = self.generate_month(month, year, departments, opts)?;
        let _removed = self
            .registry
            .replace_month(month, year, departments, generation.entries.clone());
        #[cfg(feature = "logging")]
        tracing::info!(
            month,
            year,
            written = generation.entries.len(),
            replaced = _removed,
            "month regenerated"
        );
        Ok(generation)
    }

    fn require_department(&self, id: DepartmentId) -> Result<(), SchedError> {
        match self.registry.find_department(id) {
            Some(_) => Ok(()),
            None => Err(SchedError::UnknownDepartment(id.to_string())),
        }
    }
}
