//! Provider health command handler.

use scriptorium::{ProviderHealthStatus, Scriptorium, ScriptoriumConfig, require_providers};

/// Probe every configured provider and print one line per provider.
///
/// Fails when no provider is reachable.
pub async fn probe_providers(config: &ScriptoriumConfig) -> Result<(), Box<dyn std::error::Error>> {
    require_providers(config)?;
    let scriptorium = Scriptorium::from_config(config)?;

    let statuses = scriptorium.router().health_check_all().await;
    let mut reachable = 0usize;
    for (id, status) in &statuses {
        match status {
            ProviderHealthStatus::Healthy => {
                reachable += 1;
                println!("{:<24} healthy", id);
            }
            ProviderHealthStatus::Unavailable { reason } => {
                println!("{:<24} unavailable ({})", id, reason);
            }
        }
    }

    if reachable == 0 {
        return Err("no provider is reachable".into());
    }
    Ok(())
}
