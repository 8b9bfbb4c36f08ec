use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dsr",
    about = "Datastream repository tools: dsid allocation and remote size lookups",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the next unused dsid for a prefix
    NextId(NextIdArgs),
    /// Show the URL-parameter form of a dsid
    Param(ParamArgs),
    /// Show the URI of a datastream
    Uri(UriArgs),
    /// Ask the repository for a datastream's size
    Size(SizeArgs),
}

#[derive(Args)]
pub struct NextIdArgs {
    #[arg(short, long, default_value = "DS")]
    pub prefix: String,
    /// Existing dsids (repeat or comma-separate)
    #[arg(short, long, value_delimiter = ',')]
    pub existing: Vec<String>,
}

#[derive(Args)]
pub struct ParamArgs {
    pub dsid: String,
}

#[derive(Args, Clone)]
pub struct RepositoryArgs {
    /// TOML file with repository settings
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Repository base URL, overriding the config file
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Args)]
pub struct UriArgs {
    pub object: String,
    pub dsid: String,
    #[command(flatten)]
    pub repository: RepositoryArgs,
}

#[derive(Args)]
pub struct SizeArgs {
    pub object: String,
    pub dsid: String,
    #[command(flatten)]
    pub repository: RepositoryArgs,
    /// Treat the datastream as not yet saved (no request is made)
    #[arg(long)]
    pub new: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_next_id() {
        let cli = Cli::try_parse_from(["dsr", "next-id", "-p", "FOO", "-e", "FOO1,FOO56", "-e", "BAR3"]).unwrap();
        if let Command::NextId(args) = cli.command {
            assert_eq!(args.prefix, "FOO");
            assert_eq!(args.existing, vec!["FOO1", "FOO56", "BAR3"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_next_id_defaults() {
        let cli = Cli::try_parse_from(["dsr", "next-id"]).unwrap();
        if let Command::NextId(args) = cli.command {
            assert_eq!(args.prefix, "DS");
            assert!(args.existing.is_empty());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_param() {
        let cli = Cli::try_parse_from(["dsr", "param", "foo.bar"]).unwrap();
        if let Command::Param(args) = cli.command {
            assert_eq!(args.dsid, "foo.bar");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_size_with_repository() {
        let cli = Cli::try_parse_from([
            "dsr", "size", "1234", "abcd", "--url", "http://repo:8080", "--config", "dsr.toml", "--new",
        ])
        .unwrap();
        if let Command::Size(args) = cli.command {
            assert_eq!(args.object, "1234");
            assert_eq!(args.dsid, "abcd");
            assert_eq!(args.repository.url.as_deref(), Some("http://repo:8080"));
            assert_eq!(args.repository.config, Some(PathBuf::from("dsr.toml")));
            assert!(args.new);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_uri() {
        let cli = Cli::try_parse_from(["dsr", "uri", "1234", "FOO1"]).unwrap();
        assert!(matches!(cli.command, Command::Uri(_)));
    }

    #[test]
    fn parse_verbose_json() {
        let cli = Cli::try_parse_from(["dsr", "--verbose", "--format", "json", "param", "x"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn size_requires_dsid() {
        assert!(Cli::try_parse_from(["dsr", "size", "1234"]).is_err());
    }
}
