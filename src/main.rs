use std::process;

use aef::app::App;

mod allocator;

/// Entry point: parse flags, run, exit 1 on failure.
fn main() {
    if let Err(e) = App::init().and_then(App::execute) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
