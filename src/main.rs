use std::process::exit;

fn main() {
    if let Err(e) = carview::app::run_cli() {
        eprintln!("{e}");
        exit(1);
    }
}
