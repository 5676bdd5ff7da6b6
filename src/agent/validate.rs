//! Character configuration schema validation

use crate::agent::types::CharacterConfig;
use crate::error::{Error, Result};
use std::collections::HashSet;

/// Validate a raw character payload and return the normalized configuration.
///
/// Client names are trimmed and lower-cased. Every violated rule is reported
/// in one `Error::Validation` message.
pub fn validate_character_config(raw: &serde_json::Value) -> Result<CharacterConfig> {
    if !raw.is_object() {
        return Err(Error::Validation(
            "character must be a JSON object".to_string(),
        ));
    }

    let mut character: CharacterConfig = serde_json::from_value(raw.clone())
        .map_err(|e| Error::Validation(e.to_string()))?;

    let mut problems = Vec::new();

    if character.name.trim().is_empty() {
        problems.push("name: must not be empty".to_string());
    }
    if let Some(id) = &character.id {
        if id.trim().is_empty() {
            problems.push("id: must not be empty when present".to_string());
        }
    }
    if character.bio.is_blank() {
        problems.push("bio: must not be empty".to_string());
    }
    if character.model_provider.trim().is_empty() {
        problems.push("modelProvider: must not be empty".to_string());
    }

    let mut seen = HashSet::new();
    for client in character.clients.iter_mut().flatten() {
        *client = client.trim().to_ascii_lowercase();
        if client.is_empty() {
            problems.push("clients: entries must not be empty".to_string());
        } else if !seen.insert(client.clone()) {
            problems.push(format!("clients: duplicate client '{}'", client));
        }
    }

    if !problems.is_empty() {
        return Err(Error::Validation(problems.join("; ")));
    }

    character.name = character.name.trim().to_string();
    Ok(character)
}
