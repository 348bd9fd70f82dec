use clap::Parser;
use anyhow::{Context, Result};

use interesting::{
    cli::Cli,
    config::{InterestsFile, Settings},
    core::{normalize_after, InterestMatcher, SshTransport},
    export::render,
    remote::{resolve_git_remote, GerritRemote},
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();

    if let Err(err) = cli.validate(&settings) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    cli.setup_logging();

    let url = match &cli.url {
        Some(url) => url.clone(),
        None => resolve_git_remote(&cli.get_remote(&settings))?,
    };
    tracing::debug!("got url = {}", url);

    let remote = GerritRemote::parse(&url)?;

    let interests_path = cli.get_interests_path(&settings);
    let interests = InterestsFile::load(&interests_path)
        .with_context(|| format!("Failed to load interests from {}", interests_path.display()))?;
    interests.validate()?;

    let selected = interests.select(&cli.queries);
    if selected.is_empty() {
        tracing::warn!("no interests selected");
    }

    let transport = SshTransport::from_remote(&remote).with_program(settings.ssh_program.as_str());
    let matcher = InterestMatcher::new(transport)
        .with_after(cli.after.as_deref().map(normalize_after));

    let results = matcher.find(selected)?;
    tracing::debug!("{} change(s) matched", results.len());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&results, cli.output, &mut out)?;

    Ok(())
}
