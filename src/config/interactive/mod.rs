
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Password, Select};

use super::{Config, ConfigError, ExtractionConfig, OllamaConfig, SerpApiConfig};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Place Keywords Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("SerpApi").bold().yellow());
    eprintln!("Reviews are fetched through SerpApi's Google Maps engines.");
    eprintln!();
    configure_serpapi(&mut config.serpapi)?;

    let location: String = Input::new()
        .with_prompt("Client location used to bias place search (blank for none)")
        .default(config.geocoding.client_location.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    config.geocoding.client_location = Some(location).filter(|l| !l.trim().is_empty());

    eprintln!();
    eprintln!("{}", style("Ollama Configuration").bold().yellow());
    eprintln!("Configure your local Ollama instance for embedding generation.");
    eprintln!();
    configure_ollama(&mut config.ollama)?;

    eprintln!();
    eprintln!("{}", style("Extraction Defaults").bold().yellow());
    configure_extraction(&mut config.extraction)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_ollama_connection(&config.ollama) {
        eprintln!("{}", style("✓ Ollama connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Ollama").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before extracting.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());

        let config_path = config
            .config_file_path()
            .context("Failed to get config file path")?;
        eprintln!(
            "Configuration saved to: {}",
            style(config_path.display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("SerpApi Settings:").bold().yellow());
    eprintln!("  Base URL: {}", style(&config.serpapi.base_url).cyan());
    eprintln!("  API Key: {}", key_status(&config.serpapi.api_key));
    eprintln!("  Language: {}", style(&config.serpapi.language).cyan());
    eprintln!("  Zoom: {}", style(&config.serpapi.zoom).cyan());

    eprintln!();
    eprintln!("{}", style("Geocoding Settings:").bold().yellow());
    eprintln!("  API Key: {}", key_status(&config.geocoding.api_key));
    match &config.geocoding.client_location {
        Some(location) => eprintln!("  Client Location: {}", style(location).cyan()),
        None => eprintln!("  Client Location: {}", style("not set").dim()),
    }

    eprintln!();
    eprintln!("{}", style("Ollama Settings:").bold().yellow());
    match config.ollama_url() {
        Ok(url) => eprintln!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Ollama URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!("  Model: {}", style(&config.ollama.model).cyan());
    eprintln!("  Batch Size: {}", style(config.ollama.batch_size).cyan());

    eprintln!();
    eprintln!("{}", style("Extraction Defaults:").bold().yellow());
    eprintln!("  Top N: {}", style(config.extraction.top_n).cyan());
    eprintln!("  Diversity: {}", style(config.extraction.diversity).cyan());
    eprintln!("  Page Cap: {}", style(config.extraction.page_cap).cyan());
    eprintln!(
        "  N-gram Range: {}",
        style(format!(
            "({}, {})",
            config.extraction.ngram_min, config.extraction.ngram_max
        ))
        .cyan()
    );
    eprintln!(
        "  Custom Keywords: {}",
        style(config.extraction.custom_keywords.join(", ")).cyan()
    );

    let config_path = config
        .config_file_path()
        .context("Failed to get config file path")?;
    eprintln!();
    eprintln!("Config file: {}", style(config_path.display()).dim());

    Ok(())
}

fn key_status(key: &str) -> console::StyledObject<&'static str> {
    if key.trim().is_empty() {
        style("missing").red()
    } else {
        style("set").green()
    }
}

fn load_existing_config() -> Result<Config> {
    Config::load().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config::default())
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_serpapi(serpapi: &mut SerpApiConfig) -> Result<()> {
    let api_key = Password::new()
        .with_prompt("SerpApi key (blank keeps the current value)")
        .allow_empty_password(true)
        .interact()?;
    if !api_key.trim().is_empty() {
        serpapi.api_key = api_key;
    }

    let language: String = Input::new()
        .with_prompt("Review language (hl)")
        .default(serpapi.language.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Language cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let zoom: String = Input::new()
        .with_prompt("Map zoom used for place search")
        .default(serpapi.zoom.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            SerpApiConfig {
                zoom: input.clone(),
                ..SerpApiConfig::default()
            }
            .validate()
        })
        .interact_text()?;

    serpapi.language = language;
    serpapi.zoom = zoom;

    Ok(())
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == ollama.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;

    let protocol = protocols[protocol_index].to_string();

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            OllamaConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..OllamaConfig::default()
            }
            .validate()
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(ollama.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(ollama.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(ollama.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    ollama.set_protocol(protocol)?;
    ollama.set_host(host)?;
    ollama.set_port(port)?;
    ollama.set_model(model)?;
    ollama.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_extraction(extraction: &mut ExtractionConfig) -> Result<()> {
    let top_n: usize = Input::new()
        .with_prompt("Number of keywords to select")
        .default(extraction.top_n)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err("Must be between 1 and 100")
            }
        })
        .interact_text()?;

    let diversity: f32 = Input::new()
        .with_prompt("Diversity (0.0 = most relevant, 1.0 = most varied)")
        .default(extraction.diversity)
        .validate_with(|input: &f32| -> Result<(), &str> {
            if (0.0..=1.0).contains(input) {
                Ok(())
            } else {
                Err("Must be between 0.0 and 1.0")
            }
        })
        .interact_text()?;

    let page_cap: u32 = Input::new()
        .with_prompt("Maximum review pages to fetch")
        .default(extraction.page_cap)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if (1..=50).contains(input) {
                Ok(())
            } else {
                Err("Must be between 1 and 50")
            }
        })
        .interact_text()?;

    let custom: String = Input::new()
        .with_prompt("Custom keywords (comma separated)")
        .default(extraction.custom_keywords.join(", "))
        .allow_empty(true)
        .interact_text()?;

    extraction.set_top_n(top_n)?;
    extraction.set_diversity(diversity)?;
    extraction.set_page_cap(page_cap)?;
    extraction.custom_keywords = parse_keyword_list(&custom);

    Ok(())
}

/// Split a comma separated keyword list, dropping blanks
fn parse_keyword_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn test_ollama_connection(ollama: &OllamaConfig) -> bool {
    let url = format!(
        "{}://{}:{}/api/version",
        ollama.protocol, ollama.host, ollama.port
    );

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    match agent.get(&url).call() {
        Ok(_) => true,
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => true,
        Err(_) => false,
    }
}
