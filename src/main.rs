mod cli;

use cli::parse_args;
use env_logger::Builder;
use log::LevelFilter;
use shutterbox::{Scanner, Settings, TransferManager};
use std::io::Write;
use std::process;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

// Sets up env_logger with the formatting "LEVEL message".
fn enable_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "{} {}", record.level(), record.args()))
        .init();
}

fn main() {
    let args = parse_args();
    enable_logging(args.verbose);

    let settings = match Settings::load(&args.settings) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Failed to load settings: {err}");
            process::exit(1);
        }
    };
    if let Err(err) = settings.scan_configuration_valid() {
        eprintln!("{err}");
        process::exit(1);
    }
    if !args.scan_only {
        if let Err(err) = settings.copy_configuration_valid() {
            eprintln!("{err}");
            process::exit(1);
        }
    }

    // The scan runs on its own thread; this one polls the counters.
    let mut scanner = Scanner::new();
    let files_found = scanner.files_found_handle();
    let scan_done = scanner.completed_handle();
    let source = settings.source_directory.clone();
    let include_subdirectories = settings.include_subdirectories;

    let scan_thread = thread::spawn(move || {
        let outcome = scanner.scan(&source, include_subdirectories);
        (scanner, outcome)
    });
    while !scan_done.load(Ordering::SeqCst) {
        log::info!("Scanned {} files...", files_found.load(Ordering::SeqCst));
        thread::sleep(Duration::from_millis(250));
    }
    let (mut scanner, outcome) = match scan_thread.join() {
        Ok(result) => result,
        Err(_) => {
            eprintln!("Scan thread panicked");
            process::exit(1);
        }
    };
    if let Err(err) = outcome {
        eprintln!("{err}");
        process::exit(1);
    }

    println!("Scan completed:");
    println!("  Files found: {}", scanner.total_files_found());
    println!("  Photos with usable date: {}", scanner.photo_files().len());
    println!(
        "  Photos without usable metadata: {}",
        scanner.invalid_photo_files().len()
    );
    println!("  Videos: {}", scanner.video_files().len());
    println!("  Other files: {}", scanner.basic_files().len());

    if args.scan_only {
        return;
    }
    if !scanner.check_scan_results() {
        println!("Nothing to transfer.");
        return;
    }

    let valid_photos = scanner.take_photo_files();
    let invalid_photos = scanner.take_invalid_photo_files();

    let mut manager = TransferManager::new();
    let progress = manager.progress_handle();
    let transfer_done = manager.complete_handle();
    let transfer_settings = settings.clone();
    let move_files = args.move_files;

    let transfer_thread = thread::spawn(move || {
        manager.process_photo_files(&transfer_settings, valid_photos, invalid_photos, move_files);
        manager
    });
    while !transfer_done.load(Ordering::SeqCst) {
        log::info!("Transfer progress: {}%", progress.load(Ordering::SeqCst));
        thread::sleep(Duration::from_millis(250));
    }
    if transfer_thread.join().is_err() {
        eprintln!("Transfer thread panicked");
        process::exit(1);
    }

    println!("Transfer complete.");
}
