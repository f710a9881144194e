//! `epm serve` command - Run the web front end

use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::web::{self, AppState};

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Listen address (default: EPM_BIND, config, 127.0.0.1:8000)
    #[arg(long, short = 'b')]
    pub bind: Option<String>,
}

pub fn run(args: ServeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load()?;
    let db_path = global.db.clone().unwrap_or_else(|| config.db_path());
    let bind = args.bind.unwrap_or_else(|| config.bind());

    let state = AppState::new(db_path.clone())?;
    tracing::info!(db = %db_path.display(), "starting web front end");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    runtime.block_on(web::serve(state, &bind))?;
    Ok(())
}
