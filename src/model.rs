use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Identifiant fort pour Department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(pub u32);

/// Identifiant fort pour Doctor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoctorId(pub u32);

/// Identifiant fort pour Shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftId(pub u32);

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_id!(DepartmentId, DoctorId, ShiftId);

/// Identifiant d'une entrée persistée, attribué au moment de l'écriture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Service hospitalier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

/// Médecin rattaché à un service, avec son jour de repos hebdomadaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub department_id: DepartmentId,
    /// 0 = dimanche … 6 = samedi
    pub week_off_day: u8,
    /// Curseur historique, jamais relu par le générateur.
    #[serde(default)]
    pub current_shift_index: usize,
}

impl Doctor {
    /// Crée un médecin en validant que `week_off_day` est dans 0..=6.
    pub fn new<N: Into<String>>(
        id: DoctorId,
        name: N,
        department_id: DepartmentId,
        week_off_day: u8,
    ) -> Result<Self, String> {
        if week_off_day > 6 {
            return Err(format!("week off day must be in 0..=6, got {week_off_day}"));
        }
        Ok(Self {
            id,
            name: name.into(),
            email: None,
            phone: None,
            department_id,
            week_off_day,
            current_shift_index: 0,
        })
    }
}

/// Créneau de la rotation d'un service. `order` fixe la position dans le cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: ShiftId,
    pub department_id: DepartmentId,
    pub name: String,
    pub order: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Shift {
    /// Crée un shift en validant que les bornes diffèrent (un shift peut passer minuit).
    pub fn new<N: Into<String>>(
        id: ShiftId,
        department_id: DepartmentId,
        name: N,
        order: u32,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, String> {
        if start_time == end_time {
            return Err("shift start_time and end_time cannot be equal".to_string());
        }
        Ok(Self {
            id,
            department_id,
            name: name.into(),
            order,
            start_time,
            end_time,
        })
    }

    /// Gabarits standards : 0 = Morning, 1 = Evening, 2 = Night.
    pub fn preset(order: u32) -> Option<(&'static str, NaiveTime, NaiveTime)> {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0);
        match order {
            0 => Some(("Morning", at(8)?, at(16)?)),
            1 => Some(("Evening", at(16)?, at(0)?)),
            2 => Some(("Night", at(0)?, at(8)?)),
            _ => None,
        }
    }
}

/// Shift de référence d'un médecin dans un service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    pub doctor_id: DoctorId,
    pub department_id: DepartmentId,
    pub shift_id: ShiftId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryStatus {
    Work,
    Off,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Work => "WORK",
            EntryStatus::Off => "OFF",
        }
    }
}

/// Résultat d'une journée pour un médecin. `month` est indexé à partir de 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    pub date: NaiveDate,
    pub month: u32,
    pub year: i32,
    pub department_id: DepartmentId,
    pub shift_id: Option<ShiftId>,
    pub doctor_id: DoctorId,
    pub status: EntryStatus,
}

impl RosterEntry {
    pub fn is_off(&self) -> bool {
        self.status == EntryStatus::Off
    }
}

/// Derniers ids attribués. Ne redescendent jamais, même après suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IdCounters {
    #[serde(default)]
    pub department: u32,
    #[serde(default)]
    pub doctor: u32,
    #[serde(default)]
    pub shift: u32,
}

/// Instantané complet du registre : entrée en lecture seule du générateur.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Registry {
    #[serde(default, rename = "nextIds")]
    pub next_ids: IdCounters,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub assignments: Vec<ShiftAssignment>,
    #[serde(default)]
    pub entries: Vec<RosterEntry>,
}

impl Registry {
    pub fn find_department(&self, id: DepartmentId) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }
    pub fn find_department_by_name(&self, name: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.name == name)
    }
    pub fn find_doctor(&self, id: DoctorId) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }
    pub fn find_shift(&self, id: ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == id)
    }
    pub fn find_assignment(
        &self,
        doctor: DoctorId,
        department: DepartmentId,
    ) -> Option<&ShiftAssignment> {
        self.assignments
            .iter()
            .find(|a| a.doctor_id == doctor && a.department_id == department)
    }

    pub fn doctors_in(&self, department: DepartmentId) -> impl Iterator<Item = &Doctor> {
        self.doctors
            .iter()
            .filter(move |d| d.department_id == department)
    }

    /// Remplace les entrées du mois pour chaque médecin des `departments`
    /// demandés, y compris ceux écartés par cette génération, ainsi que les
    /// périmètres (médecin, service, mois, année) couverts par `generated`.
    /// Les nouvelles entrées reçoivent un id frais. Retourne le nombre
    /// d'entrées supprimées.
    pub fn replace_month(
        &mut self,
        month: u32,
        year: i32,
        departments: &[DepartmentId],
        generated: Vec<RosterEntry>,
    ) -> usize {
        let mut scopes: HashSet<(DoctorId, DepartmentId)> = departments
            .iter()
            .flat_map(|&dep| self.doctors_in(dep).map(move |d| (d.id, dep)))
            .collect();
        scopes.extend(
            generated
                .iter()
                .filter(|e| e.month == month && e.year == year)
                .map(|e| (e.doctor_id, e.department_id)),
        );
        let before = self.entries.len();
        self.entries.retain(|e| {
            e.month != month
                || e.year != year
                || !scopes.contains(&(e.doctor_id, e.department_id))
        });
        let removed = before - self.entries.len();

        self.entries.extend(generated.into_iter().map(|mut e| {
            e.id = Some(EntryId::random());
            e
        }));
        removed
    }

    /// Entrées d'un mois donné, triées par service, médecin puis date.
    pub fn entries_for(&self, month: u32, year: i32) -> Vec<&RosterEntry> {
        let mut out: Vec<&RosterEntry> = self
            .entries
            .iter()
            .filter(|e| e.month == month && e.year == year)
            .collect();
        out.sort_by_key(|e| (e.department_id, e.doctor_id, e.date));
        out
    }

    // Un registre antérieur aux compteurs peut encore référencer des ids
    // supprimés via ses entrées ou assignations : on prend le max de tout.
    pub(crate) fn next_department_id(&mut self) -> DepartmentId {
        let seen = self
            .departments
            .iter()
            .map(|d| d.id.0)
            .chain(self.shifts.iter().map(|s| s.department_id.0))
            .chain(self.doctors.iter().map(|d| d.department_id.0))
            .chain(self.assignments.iter().map(|a| a.department_id.0))
            .chain(self.entries.iter().map(|e| e.department_id.0))
            .max()
            .unwrap_or(0);
        self.next_ids.department = self.next_ids.department.max(seen) + 1;
        DepartmentId(self.next_ids.department)
    }
    pub(crate) fn next_doctor_id(&mut self) -> DoctorId {
        let seen = self
            .doctors
            .iter()
            .map(|d| d.id.0)
            .chain(self.assignments.iter().map(|a| a.doctor_id.0))
            .chain(self.entries.iter().map(|e| e.doctor_id.0))
            .max()
            .unwrap_or(0);
        self.next_ids.doctor = self.next_ids.doctor.max(seen) + 1;
        DoctorId(self.next_ids.doctor)
    }
    pub(crate) fn next_shift_id(&mut self) -> ShiftId {
        let seen = self
            .shifts
            .iter()
            .map(|s| s.id.0)
            .chain(self.assignments.iter().map(|a| a.shift_id.0))
            .chain(self.entries.iter().filter_map(|e| e.shift_id.map(|id| id.0)))
            .max()
            .unwrap_or(0);
        self.next_ids.shift = self.next_ids.shift.max(seen) + 1;
        ShiftId(self.next_ids.shift)
    }
}
