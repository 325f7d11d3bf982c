//! Binary entrypoint that launches the therapy relay server.

use std::process::ExitCode;

use therapy_relay::start_relay;

fn main() -> ExitCode {
    start_relay::run()
}
