#![forbid(unsafe_code)]
use roulement::{
    io,
    scheduler::{GenerateOptions, Scheduler},
    storage::{JsonStorage, Storage},
};
use tempfile::tempdir;

fn scheduled() -> Scheduler {
    let mut s = Scheduler::new();
    let dep = s.add_department("Emergency");
    let morning = s.add_preset_shift(dep, 0).unwrap();
    s.add_preset_shift(dep, 1).unwrap();
    s.add_preset_shift(dep, 2).unwrap();
    for name in ["Dr Grey", "Dr Shepherd", "Dr Bailey"] {
        let id = s.register_doctor(name, dep, None).unwrap();
        s.assign_shift(id, dep, morning).unwrap();
    }
    s
}

#[test]
fn save_and_load_registry_roundtrip() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("registry.json")).unwrap();
    assert!(storage.load_or_default().unwrap().doctors.is_empty());

    let mut s = scheduled();
    let dep = s.registry().departments[0].id;
    s.regenerate_month(2, 2026, &[dep], GenerateOptions::default())
        .unwrap();
    storage.save(s.registry()).unwrap();

    let loaded = storage.load().unwrap();
    assert_eq!(loaded.doctors, s.registry().doctors);
    assert_eq!(loaded.shifts, s.registry().shifts);
    assert_eq!(loaded.entries, s.registry().entries);
}

#[test]
fn regenerating_replaces_instead_of_appending() {
    let mut s = scheduled();
    let dep = s.registry().departments[0].id;

    let first = s
        .regenerate_month(1, 2026, &[dep], GenerateOptions::default())
        .unwrap();
    let count = s.registry().entries.len();
    assert_eq!(count, 3 * 28);

    let second = s
        .regenerate_month(1, 2026, &[dep], GenerateOptions::default())
        .unwrap();
    assert_eq!(s.registry().entries.len(), count);
    assert_eq!(first.entries, second.entries);

    // ids attribués à l'écriture, jamais par le générateur
    assert!(second.entries.iter().all(|e| e.id.is_none()));
    assert!(s.registry().entries.iter().all(|e| e.id.is_some()));
}

#[test]
fn replace_keeps_other_months() {
    let mut s = scheduled();
    let dep = s.registry().departments[0].id;
    s.regenerate_month(0, 2026, &[dep], GenerateOptions::default())
        .unwrap();
    s.regenerate_month(1, 2026, &[dep], GenerateOptions::default())
        .unwrap();
    s.regenerate_month(1, 2026, &[dep], GenerateOptions::default())
        .unwrap();
    assert_eq!(s.registry().entries_for(0, 2026).len(), 3 * 31);
    assert_eq!(s.registry().entries_for(1, 2026).len(), 3 * 28);
}

#[test]
fn persisted_entry_uses_wire_field_names() {
    let s = scheduled();
    let dep = s.registry().departments[0].id;
    let gen = s
        .generate_month(1, 2026, &[dep], GenerateOptions::default())
        .unwrap();
    let off = gen.entries.iter().find(|e| e.is_off()).unwrap();
    let json = serde_json::to_value(off).unwrap();
    assert_eq!(json["status"], "OFF");
    assert_eq!(json["month"], 1);
    assert_eq!(json["year"], 2026);
    assert!(json["shiftId"].is_null());
    assert!(json["doctorId"].is_u64());
    assert!(json["departmentId"].is_u64());
    assert!(json.get("id").is_none());
    assert!(json["date"].as_str().unwrap().starts_with("2026-02-"));
}

#[test]
fn csv_export_uses_names_and_off_marker() {
    let mut s = scheduled();
    let dep = s.registry().departments[0].id;
    s.regenerate_month(1, 2026, &[dep], GenerateOptions::default())
        .unwrap();
    let entries = s.registry().entries_for(1, 2026);

    let mut buf = Vec::new();
    io::write_roster_csv(csv::Writer::from_writer(&mut buf), s.registry(), &entries).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Date,Doctor,Shift,Department"));
    // Dr Grey : repos le lundi, le 1er février 2026 est un dimanche
    assert_eq!(lines.next(), Some("2026-02-01,Dr Grey,Morning,Emergency"));
    assert_eq!(lines.next(), Some("2026-02-02,Dr Grey,OFF,Emergency"));
    assert_eq!(lines.next(), Some("2026-02-03,Dr Grey,Evening,Emergency"));
}

#[test]
fn imports_doctors_from_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doctors.csv");
    std::fs::write(
        &path,
        "name,department,week_off_day,email,phone\nDr Grey,Emergency,,grey@example.org,\nDr Yang,Emergency,friday,,0123456789\n",
    )
    .unwrap();
    let rows = io::import_doctors_csv(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].week_off_day, None);
    assert_eq!(rows[0].email.as_deref(), Some("grey@example.org"));
    assert_eq!(rows[1].week_off_day, Some(5));
    assert_eq!(rows[1].phone.as_deref(), Some("0123456789"));
}

#[test]
fn id_counters_survive_a_reload() {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("registry.json")).unwrap();

    let mut s = scheduled();
    let dep = s.registry().departments[0].id;
    // médecin sans assignation ni entrée : seul le compteur garde sa trace
    let temp = s.register_doctor("Dr Temp", dep, None).unwrap();
    s.remove_doctor(temp).unwrap();
    storage.save(s.registry()).unwrap();

    let mut reloaded = Scheduler::from_registry(storage.load().unwrap());
    assert_eq!(reloaded.registry().next_ids, s.registry().next_ids);
    let next = reloaded.register_doctor("Dr Next", dep, None).unwrap();
    assert!(next > temp);
}

#[test]
fn imports_shifts_from_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shifts.csv");
    std::fs::write(
        &path,
        "department,name,order,start,end\nEmergency,Day,0,07:00,19:00\nEmergency,Night,1,19:00,07:00:00\n",
    )
    .unwrap();
    let rows = io::import_shifts_csv(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].department, "Emergency");
    assert_eq!(rows[0].name, "Day");
    assert_eq!(rows[1].order, 1);
    assert_eq!(rows[1].start_time, io::parse_time("19:00").unwrap());
    assert_eq!(rows[1].end_time, io::parse_time("07:00").unwrap());
}

#[test]
fn shift_import_rejects_bad_order_and_bad_time() {
    let dir = tempdir().unwrap();

    let bad_order = dir.path().join("bad_order.csv");
    std::fs::write(
        &bad_order,
        "department,name,order,start,end\nEmergency,Day,first,07:00,19:00\n",
    )
    .unwrap();
    let err = io::import_shifts_csv(&bad_order).unwrap_err();
    assert!(format!("{err:#}").contains("invalid order for shift Day"));

    let bad_time = dir.path().join("bad_time.csv");
    std::fs::write(
        &bad_time,
        "department,name,order,start,end\nEmergency,Day,0,7h00,19:00\n",
    )
    .unwrap();
    let err = io::import_shifts_csv(&bad_time).unwrap_err();
    assert!(format!("{err:#}").contains("invalid time of day: 7h00"));
}
