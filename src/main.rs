use std::process::ExitCode;

fn main() -> ExitCode {
    rs_record_trajectory::run()
}
