use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use vekit_config::Config;
use vekit_sources::Downloader;

pub async fn handle(
    config: &Config,
    urls: &[String],
    save_dir: Option<PathBuf>,
    filenames: Option<Vec<String>>,
) -> Result<ExitCode> {
    let save_dir = save_dir.unwrap_or_else(|| config.download.save_dir.clone());
    let downloader = Downloader::new(Duration::from_secs(config.download.timeout_secs))?;

    let paths = downloader
        .download(urls, &save_dir, filenames.as_deref())
        .await?;

    for path in paths {
        println!("{}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}
