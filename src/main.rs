use clap::Parser;
use miette::Result;
use epm::cli::{Cli, Commands};

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

    // RUST_LOG wins; otherwise the server logs requests and the CLI stays quiet
    let default_filter = if global.verbose {
        "epm=debug,tower_http=debug"
    } else if matches!(cli.command, Commands::Serve(_)) {
        "epm=info,tower_http=info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init(args) => epm::cli::commands::init::run(args, &global),
        Commands::Member(cmd) => epm::cli::commands::member::run(cmd, &global),
        Commands::Release(cmd) => epm::cli::commands::release::run(cmd, &global),
        Commands::Project(cmd) => epm::cli::commands::project::run(cmd, &global),
        Commands::Activity(cmd) => epm::cli::commands::activity::run(cmd, &global),
        Commands::Refresh => epm::cli::commands::refresh::run(&global),
        Commands::Dashboard(cmd) => epm::cli::commands::dashboard::run(cmd, &global),
        Commands::Export(args) => epm::cli::commands::export::run(args, &global),
        Commands::Index(args) => epm::cli::commands::index::run(args, &global),
        Commands::Serve(args) => epm::cli::commands::serve::run(args, &global),
        Commands::Completions(args) => epm::cli::commands::completions::run(args),
    }
}
