use clap::Parser;
use miette::Result;
use rigcheck::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    rigcheck::logging::init(global.verbose);

    match cli.command {
        Commands::Check(args) => rigcheck::cli::commands::check::run(args, &global),
        Commands::Power(args) => rigcheck::cli::commands::power::run(args, &global),
        Commands::Options(args) => rigcheck::cli::commands::options::run(args, &global),
        Commands::Estimate(cmd) => rigcheck::cli::commands::estimate::run(cmd, &global),
        Commands::Rules => rigcheck::cli::commands::rules::run(&global),
        Commands::Config(cmd) => rigcheck::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => rigcheck::cli::commands::completions::run(args),
    }
}
