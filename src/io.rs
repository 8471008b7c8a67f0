use crate::model::{Registry, RosterEntry};
use anyhow::{bail, Context};
use chrono::NaiveTime;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Ligne d'import médecin ; l'id et le jour de repos manquant sont attribués
/// à l'inscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorRow {
    pub name: String,
    pub department: String,
    pub week_off_day: Option<u8>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Ligne d'import shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftRow {
    pub department: String,
    pub name: String,
    pub order: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Import de médecins depuis CSV: header `name,department[,week_off_day][,email][,phone]`
pub fn import_doctors_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<DoctorRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let department = rec.get(1).context("missing department")?.trim();
        if name.is_empty() || department.is_empty() {
            bail!("invalid doctor row (empty)");
        }
        let week_off_day = match optional(rec.get(2)) {
            Some(raw) => Some(
                parse_week_off(&raw)
                    .with_context(|| format!("invalid week_off_day for doctor {name}"))?,
            ),
            None => None,
        };
        out.push(DoctorRow {
            name: name.to_string(),
            department: department.to_string(),
            week_off_day,
            email: optional(rec.get(3)),
            phone: optional(rec.get(4)),
        });
    }
    Ok(out)
}

/// Import de shifts: header `department,name,order,start,end` (`HH:MM`)
pub fn import_shifts_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let department = rec.get(0).context("missing department")?.trim().to_string();
        let name = rec.get(1).context("missing name")?.trim().to_string();
        let order: u32 = rec
            .get(2)
            .context("missing order")?
            .trim()
            .parse()
            .with_context(|| format!("invalid order for shift {name}"))?;
        let start_time = parse_time(rec.get(3).context("missing start")?.trim())?;
        let end_time = parse_time(rec.get(4).context("missing end")?.trim())?;
        out.push(ShiftRow {
            department,
            name,
            order,
            start_time,
            end_time,
        });
    }
    Ok(out)
}

fn optional(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepte 0..=6 (0 = dimanche) ou un nom de jour anglais.
pub fn parse_week_off(raw: &str) -> anyhow::Result<u8> {
    if let Ok(n) = raw.parse::<u8>() {
        if n > 6 {
            bail!("week off day must be in 0..=6");
        }
        return Ok(n);
    }
    let lower = raw.to_ascii_lowercase();
    crate::scheduler::WEEKDAY_NAMES
        .iter()
        .position(|d| d.to_ascii_lowercase().starts_with(&lower) && lower.len() >= 3)
        .map(|i| i as u8)
        .with_context(|| format!("unknown weekday: {raw}"))
}

pub fn parse_time(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .with_context(|| format!("invalid time of day: {raw}"))
}

/// Export JSON des entrées, au format persisté.
pub fn export_roster_json<P: AsRef<Path>>(path: P, entries: &[&RosterEntry]) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(entries)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export tableur: header `Date,Doctor,Shift,Department`
pub fn export_roster_csv<P: AsRef<Path>>(
    path: P,
    registry: &Registry,
    entries: &[&RosterEntry],
) -> anyhow::Result<()> {
    let w = WriterBuilder::new().has_headers(true).from_path(path)?;
    write_roster_csv(w, registry, entries)
}

pub fn write_roster_csv<W: std::io::Write>(
    mut w: csv::Writer<W>,
    registry: &Registry,
    entries: &[&RosterEntry],
) -> anyhow::Result<()> {
    w.write_record(["Date", "Doctor", "Shift", "Department"])?;
    for e in entries {
        let date = e.date.format("%Y-%m-%d").to_string();
        let doctor = registry
            .find_doctor(e.doctor_id)
            .map(|d| d.name.as_str())
            .unwrap_or("");
        let shift = if e.is_off() {
            "OFF"
        } else {
            e.shift_id
                .and_then(|id| registry.find_shift(id))
                .map(|s| s.name.as_str())
                .unwrap_or("OFF")
        };
        let department = registry
            .find_department(e.department_id)
            .map(|d| d.name.as_str())
            .unwrap_or("");
        w.write_record([date.as_str(), doctor, shift, department])?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_off_accepts_numbers_and_names() {
        assert_eq!(parse_week_off("0").unwrap(), 0);
        assert_eq!(parse_week_off("Wednesday").unwrap(), 3);
        assert_eq!(parse_week_off("sat").unwrap(), 6);
        assert!(parse_week_off("7").is_err());
        assert!(parse_week_off("mo").is_err());
    }

    #[test]
    fn time_accepts_minutes_and_seconds() {
        assert_eq!(
            parse_time("16:00").unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time("00:00:00").unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
    }
}
