use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use roster::{Applied, Backend, Config, FormInput, KeyValueStorage, LoadSource, Roster, Student, form, render};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Roster CLI - Student roster editor with explicit persistence")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file (default: <config dir>/roster/roster.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding persisted state
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the roster
    List,

    /// Print one student
    Show { id: u64 },

    /// Add a student
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        course: String,
        #[arg(long, allow_hyphen_values = true)]
        age: String,
        /// Apply the change without saving it
        #[arg(long)]
        no_save: bool,
    },

    /// Edit a student; omitted fields keep their current values
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        age: Option<String>,
        /// Apply the change without saving it
        #[arg(long)]
        no_save: bool,
    },

    /// Delete a student
    Delete {
        id: u64,
        /// Apply the change without saving it
        #[arg(long)]
        no_save: bool,
    },

    /// Write the roster as an HTML page
    Render {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove persisted state and reload the default data
    Reset,
}

fn main() -> Result<()> {
    // Logs go to stderr so table output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    let storage = config.open_storage()?;
    let mut roster: Roster<Box<dyn KeyValueStorage>> = Roster::open_with_key(storage, config.storage_key.clone());
    print_status(roster.source());

    match cli.command {
        Commands::List => print_table(roster.list()),
        Commands::Show { id } => match roster.get(id) {
            Some(student) => print_table(std::slice::from_ref(student)),
            None => return Err(eyre!("No student with id {}", id)),
        },
        Commands::Add {
            name,
            course,
            age,
            no_save,
        } => {
            let input = FormInput::new(name, course, age);
            submit(&mut roster, &input)?;
            persist(&mut roster, no_save)?;
        }
        Commands::Edit {
            id,
            name,
            course,
            age,
            no_save,
        } => {
            let current = roster.get(id).ok_or_else(|| eyre!("No student with id {}", id))?;
            let mut input = FormInput::for_edit(current);
            if let Some(name) = name {
                input.name = name;
            }
            if let Some(course) = course {
                input.course = course;
            }
            if let Some(age) = age {
                input.age = age;
            }
            submit(&mut roster, &input)?;
            persist(&mut roster, no_save)?;
        }
        Commands::Delete { id, no_save } => delete(&mut roster, id, no_save)?,
        Commands::Render { output } => {
            let page = render::render_page(roster.list(), &roster.source().to_string());
            match output {
                Some(path) => {
                    fs::write(&path, page)?;
                    println!("{} {}", "Wrote".green(), path.display());
                }
                None => print!("{}", page),
            }
        }
        Commands::Reset => {
            roster.reset()?;
            println!("{}", "Storage reset, default data loaded".green());
            print_table(roster.list());
        }
    }

    Ok(())
}

fn submit<S: KeyValueStorage>(roster: &mut Roster<S>, input: &FormInput) -> Result<()> {
    match form::submit(roster, input)? {
        Applied::Created(student) => println!("{} student {}", "Created".green(), student.id),
        Applied::Updated(id) => println!("{} student {}", "Updated".green(), id),
        Applied::Missing(id) => println!("{} no student with id {}", "Note:".yellow(), id),
    }
    Ok(())
}

/// Delete `id` and save; an absent id changes nothing, so storage is left alone
fn delete<S: KeyValueStorage>(roster: &mut Roster<S>, id: u64, no_save: bool) -> Result<()> {
    if roster.get(id).is_none() {
        println!("{} no student with id {}, nothing to save", "Note:".yellow(), id);
        return Ok(());
    }
    roster.delete(id);
    println!("{} student {}", "Deleted".green(), id);
    persist(roster, no_save)
}

fn persist<S: KeyValueStorage>(roster: &mut Roster<S>, no_save: bool) -> Result<()> {
    if no_save {
        println!("{}", "Changes not saved (--no-save)".yellow());
        return Ok(());
    }
    roster.save()?;
    println!("{}", "Saved".green());
    Ok(())
}

fn print_status(source: LoadSource) {
    let line = source.to_string();
    match source {
        LoadSource::Persisted | LoadSource::Fresh => eprintln!("{}", line.dimmed()),
        LoadSource::Empty => eprintln!("{}", line.cyan()),
        LoadSource::Invalid => eprintln!("{}", line.yellow()),
    }
}

fn print_table(students: &[Student]) {
    if students.is_empty() {
        println!("{}", render::EMPTY_ROW_TEXT.dimmed());
        return;
    }

    let name_width = students.iter().map(|s| s.name.chars().count()).max().unwrap_or(0).max(4);
    let course_width = students.iter().map(|s| s.course.chars().count()).max().unwrap_or(0).max(6);

    println!(
        "{:>4}  {:<name_width$}  {:<course_width$}  {}",
        "ID".bold(),
        "Name".bold(),
        "Course".bold(),
        "Age".bold(),
    );
    for student in students {
        println!(
            "{:>4}  {:<name_width$}  {:<course_width$}  {}",
            student.id.to_string().cyan(),
            student.name,
            student.course,
            student.age,
        );
    }
}
