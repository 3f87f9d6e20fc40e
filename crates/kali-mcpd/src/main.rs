use std::process::ExitCode;

fn main() -> ExitCode {
    match kali_config::Config::load() {
        Ok(config) => kali_mcpd::run(&config),
        Err(error) => {
            error.print().ok();
            if error.is_informational() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
