//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::terminal::TerminalForm;
use anyhow::Context;
use hirecast_core::config::{
    ConfigOverrides, HirecastConfig, ServerOverrides, workspace_config_path,
};
use hirecast_core::render::{self, Rendered};
use hirecast_core::server::{self, FormServer};
use hirecast_core::{FormSession, InputRecord, LoadedArtifacts};
use std::path::Path;
use std::sync::Arc;

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace, config_file),
        Commands::Form => handle_form(workspace, config_file),
        Commands::Serve { host, port } => handle_serve(workspace, config_file, host, port).await,
        Commands::Predict {
            age,
            healthy_eating,
            active_lifestyle,
            gender,
            json,
        } => handle_predict(
            workspace,
            config_file,
            [
                age.as_str(),
                healthy_eating.as_str(),
                active_lifestyle.as_str(),
                gender.as_str(),
            ],
            json,
        ),
        Commands::Inspect => handle_inspect(workspace, config_file),
    }
}

fn load_config(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<HirecastConfig> {
    load_config_with(workspace, config_file, None)
}

fn load_config_with(
    workspace: &Path,
    config_file: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> anyhow::Result<HirecastConfig> {
    hirecast_core::load_config(Some(workspace), config_file, overrides)
        .context("Failed to load config")
}

/// Load both artifacts once; failure here ends the process.
fn load_artifacts(
    workspace: &Path,
    config: &HirecastConfig,
) -> anyhow::Result<Arc<LoadedArtifacts>> {
    let artifacts = LoadedArtifacts::load(&config.artifacts, workspace)
        .context("Cannot start without the model and scaler artifacts")?;
    Ok(Arc::new(artifacts))
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }

            let toml_str = toml::to_string_pretty(&HirecastConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(workspace, config_file)?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

fn handle_form(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(workspace, config_file)?;
    let artifacts = load_artifacts(workspace, &config)?;

    let mut source = TerminalForm::new(config.form.clone());
    source.print_title();

    let mut session = FormSession::new(&artifacts);
    let count = session.drive(&mut source, crate::terminal::print_rendered)?;
    tracing::debug!(predictions = count, "Terminal form closed");
    Ok(())
}

async fn handle_serve(
    workspace: &Path,
    config_file: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let overrides = ConfigOverrides {
        server: ServerOverrides { host, port },
    };
    let config = load_config_with(workspace, config_file, Some(&overrides))?;

    let shared = Arc::new(
        FormServer::from_config(&config, workspace)
            .context("Cannot start without the model and scaler artifacts")?,
    );

    println!(
        "Serving '{}' on http://{}:{}",
        config.form.title, config.server.host, config.server.port
    );
    server::run(shared, &config.server)
        .await
        .with_context(|| {
            format!(
                "Form server failed on {}:{}",
                config.server.host, config.server.port
            )
        })
}

fn handle_predict(
    workspace: &Path,
    config_file: Option<&Path>,
    values: [&str; 4],
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(workspace, config_file)?;
    let artifacts = load_artifacts(workspace, &config)?;

    let rendered = render::render(artifacts.predict(&InputRecord::from_values(values)));
    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        crate::terminal::print_rendered(&rendered);
    }

    match rendered {
        Rendered::Success { .. } => Ok(()),
        Rendered::Failure { kind, .. } => anyhow::bail!("Prediction failed ({})", kind),
    }
}

fn handle_inspect(workspace: &Path, config_file: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(workspace, config_file)?;
    let artifacts = load_artifacts(workspace, &config)?;

    print_artifact(
        "Model",
        artifacts.model_path(),
        artifacts.predictor().name(),
        artifacts.predictor().n_features(),
    );
    for (key, value) in artifacts.predictor().summary() {
        println!("  {:<10}{}", format!("{}:", key), value);
    }
    print_artifact(
        "Scaler",
        artifacts.scaler_path(),
        artifacts.scaler().name(),
        artifacts.scaler().n_features(),
    );
    println!(
        "Form fields: {}",
        hirecast_core::FEATURE_NAMES.join(", ")
    );
    Ok(())
}

fn print_artifact(kind: &str, path: Option<&Path>, name: &str, n_features: Option<usize>) {
    println!("{}:", kind);
    if let Some(path) = path {
        println!("  path:     {}", path.display());
    }
    println!("  type:     {}", name);
    match n_features {
        Some(n) => println!("  features: {}", n),
        None => println!("  features: any"),
    }
}
