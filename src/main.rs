use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::Mutex;

use curse::app_state::AppState;
use curse::repl::readline;
use curse::{commands, sim};
use curse_core::world::Feedback;
use curse_types::TICKS_PER_SECOND;

const TICK_INTERVAL: Duration = Duration::from_millis(1000 / TICKS_PER_SECOND);

#[derive(Parser)]
#[command(version, about = "Survival curse engine over a simulated world")]
struct Args {
    /// Read configuration from this TOML file instead of the stored config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Start with the clock paused; advance it with `wait`
    #[arg(long)]
    paused: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    let mut app = AppState::new(args.config);
    app.paused = args.paused;
    let _log_guard = curse::logging::init(app.manager.config().debug.enabled);

    let state = Arc::new(Mutex::new(app));
    let ticker = tokio::spawn(run_ticker(Arc::clone(&state)));

    loop {
        let line = tokio::task::spawn_blocking(readline)
            .await
            .map_err(|e| e.to_string())??;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, Arc::clone(&state)).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    ticker.abort();
    let mut s = state.lock().await;
    let AppState { manager, world, .. } = &mut *s;
    manager.stop_all(world);
    print_messages(&mut s);
    Ok(())
}

/// Drive the engine at the server tick rate.
async fn run_ticker(state: Arc<Mutex<AppState>>) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        let mut s = state.lock().await;
        if s.paused {
            continue;
        }
        s.advance(1);
        print_messages(&mut s);
    }
}

fn print_messages(state: &mut AppState) {
    for (name, Feedback { text, tone }) in state.drain_messages() {
        println!("[{name}] {tone:?}: {text}");
    }
}

#[derive(Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a participant (or bring one back online)
    Join {
        name: String,
        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,
        #[arg(default_value_t = 0.0, allow_negative_numbers = true)]
        z: f64,
    },
    Quit { name: String },
    Die { name: String },
    Move {
        name: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
    },
    /// Grant operator rights (every permission)
    Op { name: String },
    /// Kill opponents hunting a participant
    Kill {
        name: String,
        #[arg(default_value_t = usize::MAX)]
        count: usize,
    },
    /// Drink an item by key (curse_trigger, curse_antidote, undo_potion)
    Drink { name: String, item: String },
    /// A zombie picks up a cursed book next to a participant
    Book { name: String },
    /// Run `/curse <args>` as a participant
    As {
        name: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Set the time of day (0..24000)
    Time { value: u32 },
    /// Advance the clock by whole seconds
    Wait { seconds: u64 },
    Pause,
    Resume,
    Status,
    Exit,
}

async fn respond(line: &str, state: Arc<Mutex<AppState>>) -> Result<bool, String> {
    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    let mut s = state.lock().await;
    match cli.command {
        Some(Commands::Join { name, x, z }) => {
            let id = sim::join(&mut s, &name, x, z)?;
            println!("{name} is participant {id}");
        }
        Some(Commands::Quit { name }) => sim::quit(&mut s, &name)?,
        Some(Commands::Die { name }) => sim::die(&mut s, &name)?,
        Some(Commands::Move { name, x, z }) => sim::move_to(&mut s, &name, x, z)?,
        Some(Commands::Op { name }) => {
            let id = sim::find(&s, &name)?;
            s.world.set_operator(id, true);
        }
        Some(Commands::Kill { name, count }) => {
            let killed = sim::kill(&mut s, &name, count)?;
            println!("killed {killed} cursed zombies");
        }
        Some(Commands::Drink { name, item }) => {
            let outcome = sim::drink(&mut s, &name, &item)?;
            println!("{outcome:?}");
        }
        Some(Commands::Book { name }) => {
            let outcome = sim::drop_book(&mut s, &name)?;
            println!("{outcome:?}");
        }
        Some(Commands::As { name, args }) => {
            let id = sim::find(&s, &name)?;
            commands::execute(&mut s, id, &args)?;
        }
        Some(Commands::Time { value }) => s.world.set_time_of_day(value),
        Some(Commands::Wait { seconds }) => s.advance(seconds * TICKS_PER_SECOND),
        Some(Commands::Pause) => s.paused = true,
        Some(Commands::Resume) => s.paused = false,
        Some(Commands::Status) => {
            for line in sim::status_lines(&s) {
                println!("{line}");
            }
        }
        Some(Commands::Exit) => {
            write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
            std::io::stdout().flush().map_err(|e| e.to_string())?;
            return Ok(true);
        }
        None => {}
    }
    print_messages(&mut s);
    Ok(false)
}
