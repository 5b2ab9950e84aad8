use polars::prelude::{AnyValue, DataFrame, PolarsResult};
use slot_booking::{
    AvailabilityView, BookingOutcome, BookingPolicy, BookingRequest, CsvStore, Interval,
    IntervalError, SlotLookup, bookings_frame, format_date, free_time_frame, parse_date,
};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell = |av: &AnyValue| match av {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        _ => av.to_string(),
    };

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        rows.push(
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell(&av)).unwrap_or_default())
                .collect(),
        );
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &rows {
        for (ci, value) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(value.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let line = |values: &[String]| {
        let mut out = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            out.push(' ');
            out.push_str(value);
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&line(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_table(frame: PolarsResult<DataFrame>) {
    match frame {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error: {}", e),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                                         Show this help\n  projects                                     List projects with published availability\n  dates <project>                              List dates that still have room for a slot\n  slots <project> <date>                       Show free gaps and bookable slots\n  book <project> <date> <HH:MM-HH:MM> <instrument> <name...>\n                                               Book a slot (date as DD.MM.YYYY)\n  bookings <project>                           Show a project's bookings\n  report                                       Recompute and write the free-time report\n  policy show                                  Show the booking policy\n  policy load <json_path>                      Load the booking policy from a JSON file\n  policy save <json_path>                      Save the booking policy to a JSON file\n  quit|exit                                    Exit"
    );
}

fn print_policy(policy: &BookingPolicy) {
    println!("Slot length        : {} min", policy.slot_minutes);
    println!("Start time step    : {} min", policy.step_minutes);
    println!("Min gap (display)  : {} min", policy.display_min_gap_minutes);
    println!("Min gap (report)   : {} min", policy.report_min_gap_minutes);
}

fn join_intervals(intervals: &[Interval]) -> String {
    intervals
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Take a time range off the front of `tokens`, either as one token
/// (`11:00-14:00`) or as printed by `slots` (`11:00 - 14:00`).
fn split_range<'a, 'b>(tokens: &'a [&'b str]) -> Result<(Interval, &'a [&'b str]), IntervalError> {
    let first = tokens.first().copied().unwrap_or_default();
    match Interval::parse(first) {
        Ok(slot) => Ok((slot, &tokens[1..])),
        Err(err) if tokens.len() < 3 => Err(err),
        Err(err) => match Interval::parse(&tokens[..3].join(" ")) {
            Ok(slot) => Ok((slot, &tokens[3..])),
            Err(_) => Err(err),
        },
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let data_dir = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SLOT_BOOKING_DATA_DIR").ok())
        .unwrap_or_else(|| "data".to_string());
    let store = match CsvStore::open(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Cannot open data directory '{}': {}", data_dir, e);
            std::process::exit(1);
        }
    };

    let mut policy = match std::env::var("SLOT_BOOKING_POLICY") {
        Ok(path) => match BookingPolicy::from_json_file(&path) {
            Ok(policy) => policy,
            Err(e) => {
                eprintln!("Cannot load policy '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        Err(_) => BookingPolicy::default(),
    };

    println!(
        "Slot Booking (CLI) - data in '{}' - type 'help' for commands\n",
        store.dir().display()
    );

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        // Fresh view per command: every interaction re-reads the store.
        let view = AvailabilityView::new(&store, &policy);

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "projects" => match view.projects() {
                Ok(projects) if projects.is_empty() => println!("No availability published."),
                Ok(projects) => {
                    for project in projects {
                        println!("  {}", project);
                    }
                }
                Err(e) => println!("Error: {}", e),
            },
            "dates" => match parts.next() {
                Some(project) => match view.bookable_dates(project) {
                    Ok(dates) if dates.is_empty() => {
                        println!("No free time windows for project {}.", project)
                    }
                    Ok(dates) => {
                        for date in dates {
                            println!("  {}", format_date(date));
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: dates <project>"),
            },
            "slots" => {
                let (Some(project), Some(date_s)) = (parts.next(), parts.next()) else {
                    println!("Usage: slots <project> <date>");
                    continue;
                };
                let Some(date) = parse_date(date_s) else {
                    println!("Invalid date (DD.MM.YYYY)");
                    continue;
                };
                match view.day(project, date) {
                    Ok(SlotLookup::NoAvailability) => {
                        println!("No availability for {} on {}.", project, format_date(date))
                    }
                    Ok(SlotLookup::EmptyCandidateSet { window, gaps }) => {
                        println!("Available window: {}", window);
                        println!("Free gaps       : {}", join_intervals(&gaps));
                        println!("No {}-minute slots available.", policy.slot_minutes);
                    }
                    Ok(SlotLookup::Candidates {
                        window,
                        gaps,
                        candidates,
                    }) => {
                        println!("Available window: {}", window);
                        println!("Free gaps       : {}", join_intervals(&gaps));
                        println!("Bookable slots  :");
                        for slot in candidates {
                            println!("  {}", slot);
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "book" => {
                let rest: Vec<&str> = parts.collect();
                let [project, date_s, tail @ ..] = rest.as_slice() else {
                    println!("Usage: book <project> <date> <HH:MM-HH:MM> <instrument> <name...>");
                    continue;
                };
                let Some(date) = parse_date(date_s) else {
                    println!("Invalid date (DD.MM.YYYY)");
                    continue;
                };
                let (slot, tail) = match split_range(tail) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                let [instrument, name @ ..] = tail else {
                    println!("Usage: book <project> <date> <HH:MM-HH:MM> <instrument> <name...>");
                    continue;
                };
                let person = name.join(" ");
                let request = BookingRequest {
                    project: project.to_string(),
                    date,
                    slot,
                    instrument: instrument.to_string(),
                    person,
                };
                match view.book(&request) {
                    Ok(BookingOutcome::Committed(record)) => println!(
                        "Booking for {} on {} ({}) saved.",
                        record.project,
                        format_date(record.date),
                        record.slot
                    ),
                    Ok(BookingOutcome::Rejected(rejection)) => {
                        println!("Booking rejected: {}. Please pick another slot.", rejection)
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "bookings" => match parts.next() {
                Some(project) => match view.project_bookings(project) {
                    Ok(bookings) if bookings.is_empty() => println!("No bookings yet."),
                    Ok(bookings) => print_table(bookings_frame(&bookings)),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: bookings <project>"),
            },
            "report" => match view.refresh_free_time() {
                Ok(report) => {
                    println!("Free-time report written ({} rows).", report.len());
                    print_table(free_time_frame(&report));
                }
                Err(e) => println!("Error: {}", e),
            },
            "policy" => match (parts.next(), parts.next()) {
                (Some("show"), _) => print_policy(&policy),
                (Some("load"), Some(path)) => match BookingPolicy::from_json_file(path) {
                    Ok(loaded) => {
                        policy = loaded;
                        println!("Policy loaded from {}.", path);
                        print_policy(&policy);
                    }
                    Err(e) => println!("Error: {}", e),
                },
                (Some("save"), Some(path)) => match policy.save_json_file(path) {
                    Ok(()) => println!("Policy saved to {}.", path),
                    Err(e) => println!("Error: {}", e),
                },
                _ => println!("Usage: policy <show|load <path>|save <path>>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
