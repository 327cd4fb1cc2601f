use blogdoc::cli::{Cli, run};
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    blogdoc::logger::set_verbose(cli.verbose);

    if let Err(e) = run(&cli) {
        blogdoc::log!("error"; "{e:#}");
        std::process::exit(1);
    }
}
