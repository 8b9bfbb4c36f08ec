use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use dsr_content::Datastream;
use dsr_store::{HttpRepository, RepositoryConfig};
use dsr_types::{next_id, DatastreamId};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::NextId(args) => cmd_next_id(args, &format),
        Command::Param(args) => cmd_param(args, &format),
        Command::Uri(args) => cmd_uri(args, &format),
        Command::Size(args) => cmd_size(args, &format),
    }
}

fn repository_config(args: &RepositoryArgs) -> anyhow::Result<RepositoryConfig> {
    let config = match &args.config {
        Some(path) => RepositoryConfig::load(path)
            .with_context(|| format!("loading repository config {}", path.display()))?,
        None => RepositoryConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(url) = &args.url {
        config.base_url = url.clone();
    }
    Ok(config)
}

fn describe_size(size: Option<u64>) -> String {
    match size {
        Some(n) => format!("{n} bytes"),
        None => "unknown".to_string(),
    }
}

fn cmd_next_id(args: NextIdArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let next = next_id(&args.existing, &args.prefix);
    match format {
        OutputFormat::Text => println!("{}", next.green().bold()),
        OutputFormat::Json => println!("{}", json!({ "prefix": args.prefix, "next": next })),
    }
    Ok(())
}

fn cmd_param(args: ParamArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let dsid = DatastreamId::new(args.dsid)?;
    let param = dsid.to_param();
    match format {
        OutputFormat::Text => println!("{param}"),
        OutputFormat::Json => println!("{}", json!({ "dsid": dsid.as_str(), "param": param })),
    }
    Ok(())
}

fn cmd_uri(args: UriArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = repository_config(&args.repository)?;
    let locator = config
        .object_locator(&args.object)?
        .datastream(DatastreamId::new(args.dsid)?);
    match format {
        OutputFormat::Text => println!("{}", locator.uri().blue()),
        OutputFormat::Json => println!(
            "{}",
            json!({ "uri": locator.uri(), "path": locator.relative_path() })
        ),
    }
    Ok(())
}

fn cmd_size(args: SizeArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = repository_config(&args.repository)?;
    let repo = Arc::new(HttpRepository::new(config)?);
    let object = repo.config().object_locator(&args.object)?;
    let datastream = Datastream::new(&object, DatastreamId::new(args.dsid)?, repo, args.new);

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let (size, empty, has_content) = runtime
        .block_on(async {
            let size = datastream.size().await?;
            let empty = datastream.is_empty().await?;
            let has_content = datastream.has_content().await?;
            Ok::<_, dsr_store::StoreError>((size, empty, has_content))
        })
        .with_context(|| format!("resolving size of {}", datastream.uri()))?;

    match format {
        OutputFormat::Text => {
            println!("{}", datastream.to_string().dimmed());
            println!("  Size: {}", describe_size(size).bold());
            println!("  Empty: {}", if empty { "yes".yellow() } else { "no".normal() });
            println!(
                "  Content: {}",
                if has_content { "✓".green() } else { "✗".red() }
            );
        }
        OutputFormat::Json => println!(
            "{}",
            json!({
                "uri": datastream.uri(),
                "size": size,
                "empty": empty,
                "has_content": has_content,
            })
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_known_and_unknown_sizes() {
        assert_eq!(describe_size(Some(0)), "0 bytes");
        assert_eq!(describe_size(Some(9999)), "9999 bytes");
        assert_eq!(describe_size(None), "unknown");
    }

    #[test]
    fn url_flag_overrides_config() {
        let args = RepositoryArgs {
            config: None,
            url: Some("http://repo.example.org:8080".into()),
        };
        let config = repository_config(&args).unwrap();
        assert_eq!(config.base_url, "http://repo.example.org:8080");
        assert_eq!(config.root(), "http://repo.example.org:8080/fedora/rest/test");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = RepositoryArgs {
            config: Some("/nonexistent/dsr.toml".into()),
            url: None,
        };
        assert!(repository_config(&args).is_err());
    }
}
