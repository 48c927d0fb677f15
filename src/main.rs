//! pathtrace-viewer - render a scene descriptor progressively and save the result.

use std::env;
use std::path::PathBuf;

fn print_usage(prog: &str) {
    eprintln!("Usage: {} SCENEFILE.json", prog);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG=debug   verbose logging");
    eprintln!("  PT_TRACE=1       write a Chrome trace to trace.json");
    eprintln!();
    eprintln!(
        "Built {} {}",
        env!("PT_BUILD_DATE"),
        env!("PT_BUILD_TIME")
    );
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("pathtrace-viewer");

    let Some(scene) = args.get(1) else {
        print_usage(prog);
        std::process::exit(1);
    };

    if let Err(e) = pathtrace_viewer::viewer::run(PathBuf::from(scene)) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
