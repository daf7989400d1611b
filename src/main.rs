// Entry point and high-level CLI flow.
//
// - Option [1] loads the trip, place and district exports, printing counts.
// - Option [2] builds the analytics snapshot, writes it as JSON plus CSV
//   breakdowns, and previews every section on the console.
// - After a snapshot, the user can go back to the menu or exit.
use once_cell::sync::Lazy;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tourism_analytics::config::CONFIG_FILE;
use tourism_analytics::util::{format_int, parse_date_safe};
use tourism_analytics::{
    build_snapshot_now, fetch_dataset, output, AnalyticsConfig, CsvSource, Dataset, DateRange,
    SnapshotRequest,
};
use tracing_subscriber::EnvFilter;

// Loaded once, reused for as many snapshots as the user asks for.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Dataset>,
}

// A poisoned lock still holds usable data; a handler that panicked mid-update
// leaves at worst a stale dataset.
fn lock_state<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("app state lock was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// One trimmed line from `input`; `None` once input is closed or unreadable.
fn read_answer<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) => None,
        Ok(_) => Some(buf.trim().to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read from stdin");
            None
        }
    }
}

fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    read_answer(&mut io::stdin().lock())
}

fn prompt_back_to_menu() -> bool {
    loop {
        let Some(answer) = prompt("Back to Menu (Y/N): ") else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Ask for an optional window. Blank input keeps the default lookback.
fn prompt_window() -> Option<DateRange> {
    let from = prompt("Window start (YYYY-MM-DD, blank for default): ")?;
    let from = parse_date_safe(Some(from.as_str()))?;
    let to = prompt("Window end (YYYY-MM-DD): ")?;
    match parse_date_safe(Some(to.as_str())) {
        Some(to) => Some(DateRange::new(from, to)),
        None => {
            println!("Unrecognized end date; using the default window.");
            None
        }
    }
}

async fn handle_load(config: &AnalyticsConfig) {
    let source = CsvSource::new(&config.data);
    match fetch_dataset(&source).await {
        Ok(data) => {
            println!(
                "Loaded {} trips, {} places, {} districts.\n",
                format_int(data.trips.len()),
                format_int(data.places.len()),
                format_int(data.districts.len())
            );
            lock_state(&APP_STATE).data = Some(data);
        }
        Err(e) => {
            eprintln!("Failed to load data: {}\n", e);
        }
    }
}

fn handle_snapshot(config: &AnalyticsConfig) {
    let data = lock_state(&APP_STATE).data.clone();
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the exports first (option 1).\n");
        return;
    };

    let request = SnapshotRequest {
        window: prompt_window(),
        top_n: None,
    };
    println!("\nGenerating snapshot...\n");
    let snapshot = build_snapshot_now(&data, &request, config);

    let out = &config.data.output;
    match output::write_json(out, &snapshot) {
        Ok(()) => println!("Snapshot saved to {}", out.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
    let dir = out.parent().unwrap_or(Path::new("."));
    match output::write_breakdowns(dir, &snapshot) {
        Ok(files) => println!("Breakdowns exported to {}\n", files.join(", ")),
        Err(e) => eprintln!("Write error: {}", e),
    }

    output::print_snapshot(&snapshot, 12);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match AnalyticsConfig::load(Path::new(CONFIG_FILE)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read {}: {}", CONFIG_FILE, e);
            return;
        }
    };

    loop {
        println!("Tourism Analytics");
        println!("[1] Load the data exports");
        println!("[2] Generate Snapshot\n");
        let Some(choice) = prompt("Enter choice: ") else {
            println!("\nInput closed. Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&config).await,
            "2" => {
                println!();
                handle_snapshot(&config);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    #[test]
    fn closed_input_reads_as_none() {
        let mut input = Cursor::new("2\n  y \n");
        assert_eq!(read_answer(&mut input).as_deref(), Some("2"));
        assert_eq!(read_answer(&mut input).as_deref(), Some("y"));
        assert_eq!(read_answer(&mut input), None);
        assert_eq!(read_answer(&mut input), None);
    }

    #[test]
    fn blank_line_is_not_end_of_input() {
        let mut input = Cursor::new("\n");
        assert_eq!(read_answer(&mut input).as_deref(), Some(""));
        assert_eq!(read_answer(&mut Cursor::new("")), None);
    }

    #[test]
    fn poisoned_state_keeps_loaded_data() {
        let state = Arc::new(Mutex::new(AppState {
            data: Some(Dataset::default()),
        }));
        let shared = Arc::clone(&state);
        let _ = std::thread::spawn(move || {
            let _guard = shared.lock().unwrap();
            panic!("handler failed mid-update");
        })
        .join();

        assert!(state.is_poisoned());
        assert!(lock_state(&state).data.is_some());
    }
}
