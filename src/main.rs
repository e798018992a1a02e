use std::process::ExitCode;

use chess_session::session::session_config::SessionConfig;
use chess_session::shell::command_shell::run_stdio_loop;

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries shell responses.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    match run_stdio_loop(SessionConfig::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("session terminated: {err}");
            ExitCode::FAILURE
        }
    }
}
