use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match framelaned::run_server() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "framelaned: {error}").ok();
            ExitCode::FAILURE
        }
    }
}
