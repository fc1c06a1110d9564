//! Command-line interface for exporting console lists.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::BackendClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::export::{export_file_name, snapshot, write_export, ExportFormat};
use crate::resource::{ListQuery, ResourceKind};

/// Lexpanel - export lists from the legal-services admin backend.
#[derive(Parser)]
#[command(name = "lexpanel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "API_BASE_URL", global = true)]
    pub api_url: Option<String>,

    /// Session token used as bearer credentials
    #[arg(long, env = "LEXPANEL_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a resource list as CSV or JSON.
    Export {
        /// users, lawyers, transactions, content, policies or articles
        resource: ResourceKind,

        /// Output format
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Status filter
        #[arg(long)]
        status: Option<String>,

        /// Role or type filter
        #[arg(long)]
        role: Option<String>,

        /// Fields to drop from the export
        #[arg(long, value_delimiter = ',', default_value = "avatar")]
        strip: Vec<String>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.api_url {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env()?,
    };
    let token = cli.token.ok_or_else(|| {
        ClientError::Config("no session token; set LEXPANEL_TOKEN or pass --token".into())
    })?;
    let client = BackendClient::new(&config)?.with_token(token);

    match cli.command {
        Commands::Export {
            resource,
            format,
            search,
            status,
            role,
            strip,
            output,
        } => {
            let mut query = ListQuery {
                search,
                status,
                role,
                ..ListQuery::default()
            }
            .normalized();
            query.limit = Some(client.page_size());
            let strip: Vec<&str> = strip.iter().map(String::as_str).collect();
            let output = output.unwrap_or_else(|| PathBuf::from("."));

            export_command(&client, resource, format, query, &strip, &output).await
        }
    }
}

/// Execute the export command.
async fn export_command(
    client: &BackendClient,
    resource: ResourceKind,
    format: ExportFormat,
    query: ListQuery,
    strip: &[&str],
    output: &Path,
) -> Result<()> {
    // Validate output directory before fetching anything
    if !output.is_dir() {
        return Err(ClientError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Output directory does not exist: {}", output.display()),
        )));
    }

    println!(
        "{} {} as {}",
        style("Exporting").bold(),
        style(resource).cyan(),
        style(format).green()
    );

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(format!("Fetching {}...", resource.endpoint().path));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let records = match snapshot(client, resource, query, strip).await {
        Ok(records) => records,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Rendering...");
    let contents = match format.render(&records) {
        Ok(contents) => contents,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    let file_name = export_file_name(
        &resource.to_string(),
        format,
        chrono::Local::now().date_naive(),
    );
    let path = write_export(output, &file_name, &contents);
    pb.finish_and_clear();
    let path = path?;

    println!("  Records: {}", records.len());
    println!("{} {}", style("Saved to:").green().bold(), path.display());

    Ok(())
}
