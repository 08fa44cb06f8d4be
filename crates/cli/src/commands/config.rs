//! CLI defaults command

use anyhow::Result;
use headroom_lib::Attribution;
use std::path::PathBuf;

use crate::config::Config;
use crate::output::{print_header, print_json, print_success, print_warning, OutputFormat};

/// Show the stored configuration
pub fn show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config)?,
        OutputFormat::Table => {
            print_header("Headroom Configuration");
            println!("File:          {}", Config::config_path()?.display());
            println!(
                "Format:        {}",
                config.default_format.map_or("table (default)".to_string(), |f| {
                    format!("{:?}", f).to_lowercase()
                })
            );
            println!(
                "Attribution:   {}",
                config
                    .attribution
                    .map_or("nominated (default)".to_string(), |a| a.to_string())
            );
            println!(
                "Kubeconfig:    {}",
                config
                    .kubeconfig
                    .as_ref()
                    .map_or("(discovered)".to_string(), |p| p.display().to_string())
            );
        }
    }

    Ok(())
}

/// Merge new defaults into the stored configuration
pub fn set(
    mut config: Config,
    format: Option<OutputFormat>,
    attribution: Option<Attribution>,
    kubeconfig: Option<PathBuf>,
) -> Result<()> {
    if format.is_none() && attribution.is_none() && kubeconfig.is_none() {
        print_warning("Nothing to update");
        return Ok(());
    }

    if format.is_some() {
        config.default_format = format;
    }
    if attribution.is_some() {
        config.attribution = attribution;
    }
    if kubeconfig.is_some() {
        config.kubeconfig = kubeconfig;
    }

    let path = config.save()?;
    print_success(&format!("Saved {}", path.display()));
    Ok(())
}
