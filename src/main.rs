use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use folio::config::SiteConfig;
use folio::server::{self, SiteSources};

/// Static portfolio site generator with a blog and in-page widgets.
#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Site content (.yaml) - used when no subcommand specified
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory for the generated site
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the site (default behavior)
    Generate {
        /// Site content (.yaml); the bundled sample when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory for the generated site
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// wasm-pack output of folio-web to copy into assets/
        #[arg(long)]
        web_pkg: Option<PathBuf>,
    },
    /// Start development server with live reload
    Serve {
        /// Site content (.yaml); the bundled sample when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory for the generated site
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// wasm-pack output of folio-web to copy into assets/
        #[arg(long)]
        web_pkg: Option<PathBuf>,

        /// Port to run the server on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn generate(sources: &SiteSources, config: &SiteConfig) -> anyhow::Result<()> {
    let generated = server::generate(sources, config)?;
    tracing::info!(
        pages = generated.report.pages.len(),
        assets = generated.report.assets,
        "generated site for '{}' in {}",
        generated.content.profile.name,
        sources.output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = SiteConfig::from_env();
    config.log_gaps();

    match cli.command {
        Some(Commands::Generate {
            input,
            output,
            web_pkg,
        }) => {
            generate(
                &SiteSources {
                    input,
                    output,
                    web_pkg,
                },
                &config,
            )?;
        }
        Some(Commands::Serve {
            input,
            output,
            web_pkg,
            port,
        }) => {
            let sources = SiteSources {
                input,
                output,
                web_pkg,
            };
            server::serve(sources, config, port).await?;
        }
        None => {
            // Default behavior: generate if input provided
            if let Some(input) = cli.input {
                let sources = SiteSources {
                    input: Some(input),
                    output: cli.output,
                    web_pkg: None,
                };
                generate(&sources, &config)?;
            } else {
                println!("folio: no input specified. Use --help for usage.");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_with_defaults() {
        let cli = Cli::try_parse_from(["folio"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("output"));
        assert!(cli.input.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_top_level_input() {
        let cli = Cli::try_parse_from(["folio", "-i", "site.yaml", "-o", "public"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("site.yaml")));
        assert_eq!(cli.output, PathBuf::from("public"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_generate_subcommand() {
        let cli = Cli::try_parse_from([
            "folio",
            "generate",
            "--input",
            "site.yaml",
            "--output",
            "docs",
            "--web-pkg",
            "folio-web/pkg",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Generate {
                input,
                output,
                web_pkg,
            }) => {
                assert_eq!(input, Some(PathBuf::from("site.yaml")));
                assert_eq!(output, PathBuf::from("docs"));
                assert_eq!(web_pkg, Some(PathBuf::from("folio-web/pkg")));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn cli_generate_without_input_uses_sample() {
        let cli = Cli::try_parse_from(["folio", "generate"]).unwrap();
        match cli.command {
            Some(Commands::Generate { input, output, .. }) => {
                assert!(input.is_none());
                assert_eq!(output, PathBuf::from("output"));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn cli_parses_serve_subcommand() {
        let cli = Cli::try_parse_from(["folio", "serve", "--input", "site.yaml", "--port", "8080"])
            .unwrap();
        match cli.command {
            Some(Commands::Serve { input, port, .. }) => {
                assert_eq!(input, Some(PathBuf::from("site.yaml")));
                assert_eq!(port, 8080);
            }
            _ => panic!("Expected Serve command"),
        }
    }
}
