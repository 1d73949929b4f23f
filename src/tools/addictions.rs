/// Tools for managing addictions
///
/// This module implements addiction_create, addiction_update,
/// addiction_delete and addiction_list.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Addiction, AddictionUpdate, NewAddiction};
use crate::reminder::interval_for_level;
use crate::services::{AddictionService, TrackerError};
use crate::tools::{optional_edit, parse_addiction_id};

/// Parameters for creating a new addiction
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateAddictionParams {
    /// Name of the addiction (e.g. "Coffee")
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Intensity level 1-10 (defaults to 1); higher means more frequent reminders
    pub level: Option<i64>,
}

/// Parameters for updating an addiction
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateAddictionParams {
    /// ID of the addiction to update
    pub addiction_id: String,
    /// New name
    pub name: Option<String>,
    /// New description; an empty string clears it
    pub description: Option<String>,
    /// New intensity level 1-10
    pub level: Option<i64>,
}

/// Parameters for deleting an addiction
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteAddictionParams {
    /// ID of the addiction to delete, together with its entries and streak
    pub addiction_id: String,
}

/// Parameters for listing addictions
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListAddictionsParams {}

/// Response carrying one addiction
#[derive(Debug, Serialize)]
pub struct AddictionResponse {
    pub addiction: Addiction,
    pub message: String,
}

/// Response from listing addictions
#[derive(Debug, Serialize)]
pub struct ListAddictionsResponse {
    pub addictions: Vec<Addiction>,
    pub message: String,
}

fn describe(addiction: &Addiction) -> String {
    format!(
        "**{}** (level {}, reminder {})\n   ID: {}{}",
        addiction.name,
        addiction.level,
        interval_for_level(i64::from(addiction.level)),
        addiction.id,
        addiction
            .description
            .as_ref()
            .map(|d| format!("\n   {}", d))
            .unwrap_or_default()
    )
}

pub async fn create_addiction(
    service: &AddictionService,
    params: CreateAddictionParams,
) -> Result<AddictionResponse, TrackerError> {
    let addiction = service
        .create(NewAddiction {
            name: params.name,
            description: params.description,
            level: params.level,
        })
        .await?;

    let message = format!(
        "Created addiction '{}'. Reminders every {}.\nAddiction ID: {}",
        addiction.name,
        interval_for_level(i64::from(addiction.level)),
        addiction.id
    );
    Ok(AddictionResponse { addiction, message })
}

pub async fn update_addiction(
    service: &AddictionService,
    params: UpdateAddictionParams,
) -> Result<AddictionResponse, TrackerError> {
    let addiction_id = parse_addiction_id(&params.addiction_id)?;

    let addiction = service
        .update(
            &addiction_id,
            AddictionUpdate {
                name: params.name,
                description: optional_edit(params.description),
                level: params.level,
            },
        )
        .await?;

    let message = format!("Updated addiction:\n{}", describe(&addiction));
    Ok(AddictionResponse { addiction, message })
}

pub async fn delete_addiction(
    service: &AddictionService,
    params: DeleteAddictionParams,
) -> Result<String, TrackerError> {
    let addiction_id = parse_addiction_id(&params.addiction_id)?;
    let addiction = service.get(&addiction_id).await?;
    service.delete(&addiction_id).await?;

    Ok(format!(
        "Deleted addiction '{}' with all of its entries",
        addiction.name
    ))
}

pub async fn list_addictions(
    service: &AddictionService,
    _params: ListAddictionsParams,
) -> Result<ListAddictionsResponse, TrackerError> {
    let addictions = service.list().await?;

    let message = if addictions.is_empty() {
        "No addictions tracked yet. Create one to get started.".to_string()
    } else {
        let list = addictions.iter().map(describe).collect::<Vec<_>>().join("\n\n");
        format!("Tracking {} addiction(s):\n\n{}", addictions.len(), list)
    };

    Ok(ListAddictionsResponse { addictions, message })
}
