#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use roulement::{
    io,
    model::{DepartmentId, DoctorId, Registry, ShiftId},
    scheduler::{weekday_name, Continuity, GenerateOptions, Scheduler},
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de plannings de médecins (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du registre
    #[arg(long, global = true, default_value = "registry.json")]
    registry: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Créer un service
    AddDepartment {
        #[arg(long)]
        name: String,
    },

    /// Créer un shift ; sans nom ni horaires, le gabarit de la position est utilisé
    AddShift {
        /// id ou nom du service
        #[arg(long)]
        department: String,
        #[arg(long)]
        order: u32,
        #[arg(long)]
        name: Option<String>,
        /// HH:MM
        #[arg(long)]
        start: Option<String>,
        /// HH:MM
        #[arg(long)]
        end: Option<String>,
    },

    /// Inscrire un médecin (jour de repos attribué automatiquement si absent)
    AddDoctor {
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: String,
        /// 0..=6 (0 = dimanche) ou nom du jour
        #[arg(long)]
        week_off: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Supprimer un médecin ; ses entrées passées sont conservées
    RemoveDoctor {
        #[arg(long)]
        id: u32,
    },

    /// Supprimer un shift ; les médecins qui l'ont pour référence deviennent irrésolubles
    RemoveShift {
        #[arg(long)]
        id: u32,
    },

    /// Importer des médecins depuis un CSV
    ImportDoctors {
        #[arg(long)]
        csv: String,
    },

    /// Importer des shifts depuis un CSV
    ImportShifts {
        #[arg(long)]
        csv: String,
    },

    /// Poser le shift de référence d'un médecin
    Assign {
        #[arg(long)]
        doctor: u32,
        #[arg(long)]
        department: String,
        #[arg(long)]
        shift: u32,
    },

    /// Générer (et remplacer) le planning d'un mois
    Generate {
        /// 1..=12
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
        /// liste "dep1,dep2,..." (tous les services par défaut)
        #[arg(long)]
        departments: Option<String>,
        #[arg(long, value_enum, default_value_t = ContinuityArg::LastDay)]
        continuity: ContinuityArg,
        /// Échoue au premier médecin sans rotation résoluble
        #[arg(long)]
        strict: bool,
        /// Calcule sans écrire le registre
        #[arg(long)]
        dry_run: bool,
    },

    /// Lister le planning d'un mois, ou les médecins si aucun mois n'est donné
    List {
        #[arg(long, requires = "year")]
        month: Option<u32>,
        #[arg(long, requires = "month")]
        year: Option<i32>,
    },

    /// Exporter le planning d'un mois (au moins un format de sortie)
    #[command(group(
        ArgGroup::new("output")
            .required(true)
            .multiple(true)
            .args(["csv", "json"])
    ))]
    Export {
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        csv: Option<String>,
        #[arg(long)]
        json: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContinuityArg {
    LastDay,
    LastWorkingDay,
}

impl From<ContinuityArg> for Continuity {
    fn from(arg: ContinuityArg) -> Self {
        match arg {
            ContinuityArg::LastDay => Continuity::LastDay,
            ContinuityArg::LastWorkingDay => Continuity::LastWorkingDay,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.registry)?;
    let mut scheduler = Scheduler::from_registry(storage.load_or_default()?);

    let code = match cli.cmd {
        Commands::AddDepartment { name } => {
            if scheduler.registry().find_department_by_name(&name).is_some() {
                bail!("department already exists: {name}");
            }
            let id = scheduler.add_department(&name);
            storage.save(scheduler.registry())?;
            println!("department {id} created");
            0
        }
        Commands::AddShift {
            department,
            order,
            name,
            start,
            end,
        } => {
            let dep = resolve_department(scheduler.registry(), &department)?;
            let id = match (name, start, end) {
                (None, None, None) => scheduler.add_preset_shift(dep, order)?,
                (Some(name), Some(start), Some(end)) => {
                    let start = io::parse_time(&start)?;
                    let end = io::parse_time(&end)?;
                    scheduler.add_shift(dep, &name, order, start, end)?
                }
                _ => bail!("--name, --start and --end must be given together"),
            };
            storage.save(scheduler.registry())?;
            println!("shift {id} created");
            0
        }
        Commands::AddDoctor {
            name,
            department,
            week_off,
            email,
            phone,
        } => {
            let dep = resolve_department(scheduler.registry(), &department)?;
            let week_off = week_off.as_deref().map(io::parse_week_off).transpose()?;
            let id = scheduler.register_doctor(&name, dep, week_off)?;
            set_contact(scheduler.registry_mut(), id, email, phone);
            storage.save(scheduler.registry())?;
            print_doctor_created(scheduler.registry(), id);
            0
        }
        Commands::RemoveDoctor { id } => {
            let doctor = scheduler.remove_doctor(DoctorId(id))?;
            storage.save(scheduler.registry())?;
            println!("doctor {} removed ({})", doctor.id, doctor.name);
            0
        }
        Commands::RemoveShift { id } => {
            let shift = scheduler.remove_shift(ShiftId(id))?;
            let orphaned = scheduler
                .registry()
                .assignments
                .iter()
                .filter(|a| a.shift_id == shift.id)
                .count();
            storage.save(scheduler.registry())?;
            println!("shift {} removed ({})", shift.id, shift.name);
            if orphaned > 0 {
                eprintln!("{orphaned} assignment(s) now reference a missing shift");
            }
            0
        }
        Commands::ImportDoctors { csv } => {
            let rows = io::import_doctors_csv(csv)?;
            for row in rows {
                let dep = resolve_department(scheduler.registry(), &row.department)?;
                let id = scheduler.register_doctor(&row.name, dep, row.week_off_day)?;
                set_contact(scheduler.registry_mut(), id, row.email, row.phone);
                print_doctor_created(scheduler.registry(), id);
            }
            storage.save(scheduler.registry())?;
            0
        }
        Commands::ImportShifts { csv } => {
            let rows = io::import_shifts_csv(csv)?;
            for row in rows {
                let dep = resolve_department(scheduler.registry(), &row.department)?;
                let id =
                    scheduler.add_shift(dep, &row.name, row.order, row.start_time, row.end_time)?;
                println!("shift {id} created");
            }
            storage.save(scheduler.registry())?;
            0
        }
        Commands::Assign {
            doctor,
            department,
            shift,
        } => {
            let dep = resolve_department(scheduler.registry(), &department)?;
            scheduler.assign_shift(DoctorId(doctor), dep, ShiftId(shift))?;
            storage.save(scheduler.registry())?;
            0
        }
        Commands::Generate {
            month,
            year,
            departments,
            continuity,
            strict,
            dry_run,
        } => {
            let month0 = cli_month(month)?;
            let deps: Vec<DepartmentId> = match departments {
                Some(list) => list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| resolve_department(scheduler.registry(), s))
                    .collect::<Result<_>>()?,
                None => scheduler.registry().departments.iter().map(|d| d.id).collect(),
            };
            let opts = GenerateOptions {
                continuity: continuity.into(),
                strict,
            };
            let generation = if dry_run {
                scheduler.generate_month(month0, year, &deps, opts)?
            } else {
                let g = scheduler.regenerate_month(month0, year, &deps, opts)?;
                storage.save(scheduler.registry())?;
                g
            };
            println!(
                "{} entr(y/ies) generated for {:02}/{year}",
                generation.entries.len(),
                month
            );
            for s in &generation.skipped {
                eprintln!(
                    "skipped doctor {} in department {}: {}",
                    s.doctor,
                    s.department,
                    s.reason.as_str()
                );
            }
            // Code 2 = WARNING/INCOMPLETE
            if generation.is_complete() {
                0
            } else {
                2
            }
        }
        Commands::List { month, year } => {
            let registry = scheduler.registry();
            match (month, year) {
                (Some(month), Some(year)) => {
                    for e in registry.entries_for(cli_month(month)?, year) {
                        let doctor = registry
                            .find_doctor(e.doctor_id)
                            .map(|d| d.name.as_str())
                            .unwrap_or("-");
                        let shift = e
                            .shift_id
                            .and_then(|id| registry.find_shift(id))
                            .map(|s| s.name.as_str())
                            .unwrap_or("-");
                        println!(
                            "{} | {} | {} | {} | {}",
                            e.date,
                            e.department_id,
                            doctor,
                            e.status.as_str(),
                            shift
                        );
                    }
                }
                _ => {
                    for d in &registry.doctors {
                        println!(
                            "{} | {} | dep {} | off {}",
                            d.id,
                            d.name,
                            d.department_id,
                            weekday_name(d.week_off_day).unwrap_or("?")
                        );
                    }
                }
            }
            0
        }
        Commands::Export {
            month,
            year,
            csv,
            json,
        } => {
            let registry = scheduler.registry();
            let entries = registry.entries_for(cli_month(month)?, year);
            if let Some(path) = csv {
                io::export_roster_csv(path, registry, &entries)?;
            }
            if let Some(path) = json {
                io::export_roster_json(path, &entries)?;
            }
            0
        }
    };

    std::process::exit(code);
}

/// Mois saisi en 1..=12, converti en index 0..=11.
fn cli_month(month: u32) -> Result<u32> {
    if !(1..=12).contains(&month) {
        bail!("month must be in 1..=12, got {month}");
    }
    Ok(month - 1)
}

fn resolve_department(registry: &Registry, raw: &str) -> Result<DepartmentId> {
    if let Ok(n) = raw.parse::<u32>() {
        if let Some(d) = registry.find_department(DepartmentId(n)) {
            return Ok(d.id);
        }
    }
    registry
        .find_department_by_name(raw)
        .map(|d| d.id)
        .with_context(|| format!("unknown department: {raw}"))
}

fn set_contact(registry: &mut Registry, id: DoctorId, email: Option<String>, phone: Option<String>) {
    if let Some(d) = registry.doctors.iter_mut().find(|d| d.id == id) {
        d.email = email;
        d.phone = phone;
    }
}

fn print_doctor_created(registry: &Registry, id: DoctorId) {
    if let Some(d) = registry.find_doctor(id) {
        println!(
            "doctor {} created (week off: {})",
            d.id,
            weekday_name(d.week_off_day).unwrap_or("?")
        );
    }
}
