use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::{
    CommandFactory, FromArgMatches, Parser, ValueEnum, error::ErrorKind, parser::ValueSource,
};
use log::{debug, info, warn};

use crate::clients::{
    LibraryApi, SpotifyClient,
    errors::{Error, Result},
};
use crate::collector::{CollectorBuilder, DEFAULT_PAGE_SIZE, DEFAULT_WORKERS};
use crate::config::{self, FileOptions, PartialSettings};
use crate::formatter::{DEFAULT_LINE_FORMAT, OutputFormat, format_records};
use crate::router::{self, Records, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Collect resources from saved collection
    Collect,
    /// Search spotify for resources
    Search,
    /// Query a set of resources on their uris
    Query,
    /// Add resource to collection
    Save,
    /// Delete resource from collection
    Delete,
    /// Return recommendations based on given uris
    #[value(alias = "reccomend")]
    Recommend,
    /// Follow artist
    Follow,
    /// Query resources based on followed artists
    Following,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Collect => "collect",
            Action::Search => "search",
            Action::Query => "query",
            Action::Save => "save",
            Action::Delete => "delete",
            Action::Recommend => "recommend",
            Action::Follow => "follow",
            Action::Following => "following",
        }
    }

    pub fn needs_query(&self) -> bool {
        !matches!(self, Action::Collect | Action::Following)
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self, Action::Collect | Action::Search)
    }
}

#[derive(Parser, Debug)]
#[command(name = "sputils")]
#[command(
    version,
    about = "A collection of spotify utilities for use with other shell utils.",
    long_about = None
)]
pub struct Cli {
    /// Config file path
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Spotify user
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Spotify client id
    #[arg(long = "client_id")]
    pub client_id: Option<String>,

    /// Spotify client secret
    #[arg(long = "client_secret")]
    pub client_secret: Option<String>,

    #[arg(short = 'a', long, value_enum, default_value_t = Action::Collect)]
    pub action: Action,

    /// Resource to query
    #[arg(short = 'r', long, value_enum, default_value_t = Resource::Albums)]
    pub resource: Resource,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Format for outputting lines, accepts record field names
    #[arg(short = 'l', long = "line_format", default_value = DEFAULT_LINE_FORMAT)]
    pub line_format: String,

    /// Items requested per page while collecting
    #[arg(short = 's', long = "page_size", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Page requests in flight at once while collecting
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Query (valid for search, query, save, delete, recommend and follow)
    pub query: Vec<String>,

    /// Ids of the options given on the command line.
    #[arg(skip)]
    from_command_line: BTreeSet<String>,
}

fn value_from_file<T: ValueEnum>(key: &str, value: &str) -> Result<T> {
    <T as ValueEnum>::from_str(value, true)
        .map_err(|e| Error::ConfigurationError(format!("{key}: {e}")))
}

fn number_from_file<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::ConfigurationError(format!("{key}: {value:?}: {e}")))
}

impl Cli {
    /// Parse and validate arguments. Errors carry clap's usage exit code.
    pub fn try_parse_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Cli::parse_unvalidated(args)?;
        cli.validate()?;
        Ok(cli)
    }

    /// Parse arguments, remembering which options the command line set.
    pub fn parse_unvalidated<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Cli::command().try_get_matches_from(args)?;
        let mut cli = Cli::from_arg_matches(&matches)?;
        cli.from_command_line = matches
            .ids()
            .filter(|id| matches.value_source(id.as_str()) == Some(ValueSource::CommandLine))
            .map(|id| id.as_str().to_string())
            .collect();
        Ok(cli)
    }

    /// Fill options from config files. Options given on the command line
    /// keep their values.
    pub fn apply_file_options(&mut self, options: &FileOptions) -> Result<()> {
        for (key, value) in options.iter() {
            if self.from_command_line.contains(key) {
                debug!("Command line overrides config option {key}");
                continue;
            }
            match key {
                "user" => self.user = Some(value.to_string()),
                "client_id" => self.client_id = Some(value.to_string()),
                "client_secret" => self.client_secret = Some(value.to_string()),
                "action" => self.action = value_from_file(key, value)?,
                "resource" => self.resource = value_from_file(key, value)?,
                "format" => self.format = value_from_file(key, value)?,
                "line_format" => self.line_format = value.to_string(),
                "page_size" => self.page_size = number_from_file(key, value)?,
                "workers" => self.workers = number_from_file(key, value)?,
                "config" => warn!("Ignoring nested config option {value:?}"),
                _ => warn!("Ignoring unknown config option {key}"),
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), clap::Error> {
        if self.action.needs_query() && self.query.is_empty() {
            return Err(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "a query is needed for this action",
            ));
        }
        Ok(())
    }

    pub fn credential_flags(&self) -> PartialSettings {
        PartialSettings {
            user: self.user.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }

    pub fn query_string(&self) -> String {
        self.query.join(" ")
    }
}

/// Run the requested action against an authorized client.
pub async fn execute(cli: &Cli, client: &dyn LibraryApi) -> Result<Records> {
    match cli.action {
        Action::Collect => {
            let collector = CollectorBuilder::new()
                .page_size(cli.page_size)
                .workers(cli.workers)
                .build(client)?;
            router::collect_with(&collector, cli.resource).await
        }
        Action::Search => router::search(client, &cli.query_string(), cli.resource).await,
        other => Err(Error::Unimplemented(other.as_str().to_string())),
    }
}

pub async fn run() -> Result<()> {
    let mut cli = Cli::parse_unvalidated(std::env::args_os()).unwrap_or_else(|e| e.exit());

    info!("Building config ...");
    cli.apply_file_options(&config::load_options(cli.config.as_deref())?)?;
    cli.validate().unwrap_or_else(|e| e.exit());

    if !cli.action.is_implemented() {
        return Err(Error::Unimplemented(cli.action.as_str().to_string()));
    }
    let settings = cli.credential_flags().resolve()?;

    info!("Authorizing client ...");
    let spotify = SpotifyClient::try_new(&settings)?;
    // CLI prompt may be shown on this call
    spotify.authorize_client().await?;

    let records = execute(&cli, &spotify).await?;
    info!("Rendering {} records", records.len());
    println!("{}", format_records(&records, cli.format, &cli.line_format)?);
    Ok(())
}
