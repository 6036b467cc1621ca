// Entry point for the Minesweeper application
// Parses options, loads configuration, and launches the selected front-end

use std::error::Error;
use std::io;

use mfswpr::mfs_args::{USAGE, parse_args};
use mfswpr::mfs_console;
use mfswpr::mfs_game::{Session, load_or_create_config, save_config};
use mfswpr::mfs_log;
use mfswpr::mfs_ui::run as run_ui;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    if opts.help {
        println!("{}", USAGE);
        return Ok(());
    }

    mfs_log::init();

    // Load or create user configuration (difficulty, preferences, records)
    let mut cfg = load_or_create_config();
    let difficulty = opts.difficulty_for(&cfg);

    if opts.console {
        let mut session = Session::new(difficulty, opts.seed)?;
        mfs_console::play(&mut session, io::stdin().lock(), &mut io::stdout())?;
        if session.record_win(&mut cfg) {
            println!("New best time: {}s", session.elapsed_secs());
        }
        save_config(&cfg);
        return Ok(());
    }

    // Launch the main UI loop
    run_ui(&mut cfg, difficulty, opts.seed)
}
