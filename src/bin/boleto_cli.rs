use boleto_tracker::{app::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}
