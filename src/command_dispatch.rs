//! Purpose: Hold top-level CLI command dispatch for `novelfetch`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Every command prints exactly one JSON document or one URL on stdout.

use super::*;
use novelfetch::api::SeriesDownloadMode;

pub(super) fn dispatch_command(
    command: Command,
    client: &InstrumentedClient,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    let print_url = |url: &str| println!("{url}");
    let value = match command {
        Command::Completion { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::aot::generate(shell, &mut cmd, "novelfetch", &mut io::stdout());
            return Ok(RunOutcome::ok());
        }
        Command::Request { method, target } => client.request(&method, &target)?,
        Command::Novel { command } => {
            let novels = client.novels();
            match command {
                NovelCommand::Search { keyword, page } => {
                    if page == 0 {
                        return Err(Error::new(ErrorKind::Usage)
                            .with_message("page numbers start at 1"));
                    }
                    novels.search(&keyword, page)?
                }
                NovelCommand::Info { id } => novels.info(&id)?,
                NovelCommand::Content { id } => novels.content(&id)?,
                NovelCommand::Download { id, format } => {
                    novels.download(&id, &format, &print_url)?;
                    return Ok(RunOutcome::ok());
                }
            }
        }
        Command::Series { command } => {
            let series = client.series();
            match command {
                SeriesCommand::Info { id } => series.info(&id)?,
                SeriesCommand::Content { id } => series.content(&id)?,
                SeriesCommand::Download { id, mode } => {
                    series.download(&id, mode.into(), &print_url)?;
                    return Ok(RunOutcome::ok());
                }
            }
        }
        Command::Service { command } => {
            let service = client.service();
            match command {
                ServiceCommand::Welcome => service.welcome()?,
                ServiceCommand::Version => service.latest_version()?,
                ServiceCommand::Config => service.config()?,
                ServiceCommand::ProxyTest { url } => service.proxy_test(&url)?,
            }
        }
    };
    emit_json(&value, color_mode);
    Ok(RunOutcome::ok())
}

impl From<SeriesModeCli> for SeriesDownloadMode {
    fn from(value: SeriesModeCli) -> Self {
        match value {
            SeriesModeCli::Split => SeriesDownloadMode::Split,
            SeriesModeCli::Merge => SeriesDownloadMode::Merge,
        }
    }
}
