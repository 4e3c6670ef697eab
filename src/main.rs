use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use attendscan::auth::SharedPin;
use attendscan::clock::SystemClock;
use attendscan::config::Settings;
use attendscan::scan::{CommandScanner, LineScanner, ScanGuard, ScanService};
use attendscan::session::{Gate, SetupForm};
use attendscan::storage::FileStorage;
use attendscan::Tracker;

#[derive(Parser)]
#[command(author, version, about = "Class attendance by student ID QR scan")]
struct Cli {
    /// Directory holding the saved register (overrides settings)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in as course representative
    Login {
        /// Course rep PIN; prompted for when omitted
        #[arg(short, long)]
        pin: Option<String>,
    },

    /// Set up the class and start taking attendance
    Setup {
        #[arg(short, long)]
        department: Option<String>,

        #[arg(short, long)]
        course_code: Option<String>,

        #[arg(short, long)]
        level: Option<String>,

        /// Course title printed on the register
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Go back to class setup, keeping attendance taken so far
    Edit,

    /// Mark one matric number present
    Mark {
        matric: String,
    },

    /// Read decoded QR codes, one per line, and mark students present
    Scan {
        /// Decoder command to run instead of reading stdin
        #[arg(short, long)]
        command: Option<String>,
    },

    /// Show counts and the class list
    Status,

    /// Export the register as a PDF
    Export {
        /// Output file; defaults to <course code>_Attendance.pdf in the export directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Log out and clear all attendance data
    Logout {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load()?;
    if let Some(dir) = cli.state_dir {
        settings.state_dir = dir;
    }

    let mut tracker = Tracker::open(
        &settings,
        settings.seed()?,
        Box::new(FileStorage::new(&settings.state_dir)),
        Box::new(SharedPin::new(settings.pin.clone())),
        Arc::new(SystemClock),
    )?;

    match cli.command {
        Commands::Login { pin } => {
            let pin = match pin {
                Some(pin) => pin,
                None => prompt("Course Rep Matric: ")?,
            };
            tracker.login(&pin)?;
            println!("Logged in.");
            if tracker.gate() == Gate::SetupIncomplete {
                println!("Next: attendscan setup --course-code <CODE> --level <LEVEL>");
            }
        }
        Commands::Setup { department, course_code, level, title } => {
            if tracker.gate() == Gate::Active {
                bail!("Session already active. Run `attendscan edit` to change the class setup.");
            }
            let mut form = SetupForm::from_course(tracker.course());
            if let Some(department) = department {
                form.department = department;
            }
            if let Some(code) = course_code {
                form.course_code = code;
            }
            if let Some(level) = level {
                form.level = level;
            }
            if title.is_some() {
                form.course_title = title;
            }
            tracker.complete_setup(form)?;
            let course = tracker.course();
            println!("Taking attendance for {} ({}) on {}", course.course_code, course.level, course.date);
        }
        Commands::Edit => {
            tracker.edit_setup()?;
            println!("Back to class setup. Attendance taken so far is kept.");
        }
        Commands::Mark { matric } => {
            let outcome = tracker.mark(matric.trim())?;
            println!("{}", outcome.message());
        }
        Commands::Scan { command } => {
            let command = command.or_else(|| settings.scanner_command.clone());
            let service: Box<dyn ScanService> = match command {
                Some(command) => Box::new(CommandScanner::new(command)),
                None => Box::new(LineScanner::new(io::BufReader::new(io::stdin()))),
            };
            scan(&mut tracker, service, &settings)?;
        }
        Commands::Status => print_status(&tracker),
        Commands::Export { output } => {
            if tracker.gate() == Gate::Unauthenticated {
                bail!("Not logged in. Run `attendscan login` first.");
            }
            let path = match output {
                Some(path) => {
                    tracker.export_to(&path)?;
                    path
                }
                None => tracker.export_to_dir(&settings.export_dir)?,
            };
            println!("Register saved to '{}'", path.display());
        }
        Commands::Logout { yes } => {
            if !yes && !confirm("Logging out will CLEAR all attendance data. Continue? [y/N] ")? {
                println!("Cancelled.");
                return Ok(());
            }
            tracker.logout()?;
            println!("Logged out.");
        }
    }

    Ok(())
}

/// Mark every decoded code until the scanner runs dry
fn scan(tracker: &mut Tracker, service: Box<dyn ScanService>, settings: &Settings) -> Result<()> {
    if tracker.gate() != Gate::Active {
        bail!("No active session. Log in and complete the class setup first.");
    }

    let guard = ScanGuard::start(service, &settings.scanner)?;
    println!("Scanning for {}. Press Ctrl-D to stop.", tracker.course().course_code);

    while let Some(decoded) = guard.recv() {
        if let Some(outcome) = tracker.submit_scan(&decoded)? {
            let roster = tracker.roster();
            println!("{}  [{}/{} present]", outcome.message(), roster.present_count(), roster.len());
        }
    }
    Ok(())
}

fn print_status(tracker: &Tracker) {
    let state = tracker.state();
    match state.gate() {
        Gate::Unauthenticated => println!("Not logged in."),
        Gate::SetupIncomplete => println!("Logged in, class setup pending."),
        Gate::Active => {
            let course = &state.course;
            println!("{} - {} ({})", course.course_code, course.course_title, course.level);
            println!("Department: {}   Date: {}", course.department, course.date);
        }
    }

    let roster = &state.roster;
    println!(
        "Total: {}   Present: {}   Absent: {}\n",
        roster.len(),
        roster.present_count(),
        roster.absent_count()
    );
    for student in roster.students() {
        println!(
            "{:<28} {:<14} {:<8} {}",
            student.name,
            student.matric,
            student.status.to_string(),
            student.check_in_time.as_deref().unwrap_or("")
        );
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(message: &str) -> Result<bool> {
    let answer = prompt(message)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
