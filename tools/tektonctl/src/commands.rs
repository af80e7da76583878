//! Subcommand dispatch

use crate::Commands;
use anyhow::{Context, Result};
use kube::Resource;
use kube::core::NamespaceResourceScope;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Read;
use tekton_client::{ApplyAction, CallContext, ListOptions, ResourceApi, TektonClient};
use tekton_crds::TektonKind;

/// Run `command` against the facade for its kind
pub(crate) async fn run(
    client: &TektonClient,
    ctx: &CallContext,
    namespace: &str,
    command: Commands,
) -> Result<()> {
    match kind_of(&command) {
        TektonKind::Task => dispatch(client.task(ctx, namespace).await?, ctx, command).await,
        TektonKind::Pipeline => dispatch(client.pipeline(ctx, namespace).await?, ctx, command).await,
        TektonKind::PipelineRun => {
            dispatch(client.pipeline_run(ctx, namespace).await?, ctx, command).await
        }
        TektonKind::TriggerBinding => {
            dispatch(client.trigger_binding(ctx, namespace).await?, ctx, command).await
        }
        TektonKind::TriggerTemplate => {
            dispatch(client.trigger_template(ctx, namespace).await?, ctx, command).await
        }
        TektonKind::EventListener => {
            dispatch(client.event_listener(ctx, namespace).await?, ctx, command).await
        }
    }
}

fn kind_of(command: &Commands) -> TektonKind {
    match command {
        Commands::List { kind, .. }
        | Commands::Get { kind, .. }
        | Commands::GetYaml { kind, .. }
        | Commands::Delete { kind, .. }
        | Commands::Apply { kind, .. } => *kind,
    }
}

async fn dispatch<K>(api: ResourceApi<K>, ctx: &CallContext, command: Commands) -> Result<()>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope> + DeserializeOwned + Serialize,
{
    match command {
        Commands::List {
            selector,
            field_selector,
            limit,
            all,
            ..
        } => {
            let opts = ListOptions {
                label_selector: selector,
                field_selector,
                limit,
                continue_token: None,
            };
            let items = if all {
                api.list_all(ctx, &opts).await?
            } else {
                api.list(ctx, &opts).await?
            };
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Commands::Get { name, .. } => {
            let item = api.get(ctx, &name).await?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        Commands::GetYaml { name, .. } => {
            print!("{}", api.get_yaml(ctx, &name).await?);
        }
        Commands::Delete { name, .. } => {
            api.delete(ctx, &name).await?;
            println!("{}/{} deleted", K::plural(&()), name);
        }
        Commands::Apply { file, .. } => {
            let manifest = read_manifest(&file)?;
            let outcome = api.create(ctx, &manifest).await?;
            for applied in &outcome.applied {
                let verb = match applied.action {
                    ApplyAction::Created => "created",
                    ApplyAction::Updated => "configured",
                };
                println!("{}/{} {}", K::plural(&()), applied.name, verb);
            }
        }
    }
    Ok(())
}

fn read_manifest(file: &str) -> Result<String> {
    if file == "-" {
        let mut manifest = String::new();
        std::io::stdin()
            .read_to_string(&mut manifest)
            .context("failed to read manifest from stdin")?;
        return Ok(manifest);
    }
    std::fs::read_to_string(file).with_context(|| format!("failed to read manifest {file}"))
}
