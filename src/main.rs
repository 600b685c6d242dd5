use std::process::ExitCode;

fn main() -> ExitCode {
    match otdr_cut_locator::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
