use special_runner::cli;
use special_runner::core::models::CommandFailed;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            // A failing test command decides the exit code; everything else is a tool error.
            if let Some(failed) = e.downcast_ref::<CommandFailed>() {
                return ExitCode::from(failed.exit_code());
            }
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
