// src/main.rs

use pcfdev::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("pcfdev error: {err:?}");
        std::process::exit(pcfdev::exit_codes::SUPERVISOR_FAILED);
    }

    let code = match run(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("pcfdev error: {err}");
            err.exit_code()
        }
    };

    std::process::exit(code);
}
