use std::process;

fn main() {
    if let Err(e) = geopipe::cli::run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
