use std::env;

use chrono::NaiveDate;
use entsoe::{Client, TimeWindow};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!(
        "Usage:\n  cargo run --example cli -- <report> <area> <start YYYY-MM-DD> <end YYYY-MM-DD>\n\nReports: prices | load | load-forecast | generation | import | flows <to-area>\n\nExample (Belgian day-ahead prices for one week):\n  ENTSOE_API_KEY=... cargo run --example cli -- prices BE 2024-01-01 2024-01-08\n\nNotes:\n- ENTSOE_API_KEY must hold a platform security token.\n- Set RUST_LOG=entsoe=debug to see every request (token masked)."
    );
}

fn day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 5 {
        usage();
        return;
    }

    let (Some(start), Some(end)) = (day(&args[3]), day(&args[4])) else {
        eprintln!("dates must be YYYY-MM-DD");
        std::process::exit(2);
    };

    let client = match Client::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("cannot create client: {e}");
            std::process::exit(2);
        }
    };
    let area = match client.resolve(args[2].as_str()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    let window = match TimeWindow::days(area.tz(), start, end) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let result = match args[1].as_str() {
        "prices" => client.day_ahead_prices(area, &window),
        "load" => client.load(area, &window),
        "load-forecast" => client.load_and_forecast(area, &window),
        "generation" => client.generation(area, &window, None, false),
        "import" => client.import(area, &window),
        "flows" => match args.get(5) {
            Some(to) => client.crossborder_flows(area, to.as_str(), &window),
            None => {
                eprintln!("flows needs a destination area");
                std::process::exit(2);
            }
        },
        _ => {
            eprintln!("Unknown report. Use: prices|load|load-forecast|generation|import|flows");
            std::process::exit(2);
        }
    };

    match result.and_then(|table| table.to_json()) {
        Ok(json) => println!("{json}"),
        Err(e) if e.is_no_data() => {
            eprintln!("no data published for {area} in {window}");
        }
        Err(e) => {
            eprintln!("query failed: {e}");
            std::process::exit(1);
        }
    }
}
