// umtty: Universal Machine emulator with a terminal console

use std::io;
use std::path::Path;
use std::process::ExitCode;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use umtty::loader;
use umtty::machine::constants::DEFAULT_SLICE_CYCLES;
use umtty::machine::{Console, Machine, Outcome, StdConsole};
use umtty::session::{Request, Session};
use umtty::ui::App;

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} [--tui] <program.um>", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --tui    Run inside the interactive terminal console");
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("umtty");

    let mut tui = false;
    let mut files = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--tui" => tui = true,
            _ => files.push(arg.as_str()),
        }
    }

    let program_file = match files.as_slice() {
        [file] => *file,
        [] => {
            eprintln!("Error: No program file provided");
            eprintln!();
            print_usage(program_name);
            return Ok(ExitCode::FAILURE);
        }
        _ => {
            eprintln!("Error: Expected exactly one program file");
            eprintln!();
            print_usage(program_name);
            return Ok(ExitCode::FAILURE);
        }
    };

    if !Path::new(program_file).exists() {
        eprintln!("Error: File '{}' not found", program_file);
        print_usage(program_name);
        return Ok(ExitCode::FAILURE);
    }

    if tui {
        run_tui(program_file)
    } else {
        run_headless(program_file)
    }
}

/// Run on stdin/stdout until the program halts or faults
fn run_headless(program_file: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    eprintln!("Loading {}...", program_file);
    let program = match loader::load_file(program_file) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Load error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    eprintln!("Loaded {} platters.", program.len());

    let mut machine = Machine::new(program);
    let mut console = StdConsole::stdio();

    // Run in slices so output without a trailing newline still shows up
    // while the program computes. Stdin always answers synchronously, so the
    // machine never stays suspended.
    loop {
        match machine.run_for(&mut console, DEFAULT_SLICE_CYCLES) {
            Ok(Outcome::Paused) => {
                if let Err(e) = console.flush() {
                    eprintln!("Output error: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
            Ok(Outcome::Halted) => return Ok(ExitCode::SUCCESS),
            Ok(outcome) => {
                eprintln!("Machine stopped without halting: {:?}", outcome);
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => {
                eprintln!("Runtime error: {}", e);
                return Ok(ExitCode::FAILURE);
            }
        }
    }
}

/// Run inside the ratatui console
fn run_tui(program_file: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let image = match loader::read_image(program_file) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Load error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut session = Session::new();
    if let Err(e) = session.handle(Request::LoadProgram(image)) {
        eprintln!("Load error: {}", e);
        return Ok(ExitCode::FAILURE);
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let name = Path::new(program_file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program_file.to_string());
    let mut app = App::new(session, name);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
        return Ok(ExitCode::FAILURE);
    }

    if let Some((error, snapshot)) = &app.fault {
        eprintln!("{}", snapshot);
        eprintln!("Runtime error: {}", error);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
