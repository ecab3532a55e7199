use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::airports::{Airport, AirportInput};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportView {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// "CODE - Name (City)"
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Airport> for AirportView {
    fn from(airport: Airport) -> Self {
        Self {
            label: airport.display_label(),
            id: airport.id,
            code: airport.code,
            name: airport.name,
            city: airport.city,
            country: airport.country,
            latitude: airport.latitude,
            longitude: airport.longitude,
            created_at: airport.created_at,
            updated_at: airport.updated_at,
        }
    }
}

/// Compact airport reference embedded in flight views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportSummary {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub city: String,
}

impl From<&Airport> for AirportSummary {
    fn from(airport: &Airport) -> Self {
        Self {
            id: airport.id,
            code: airport.code.clone(),
            name: airport.name.clone(),
            city: airport.city.clone(),
        }
    }
}

/// Body of airport create and update requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportRequest {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<AirportRequest> for AirportInput {
    fn from(request: AirportRequest) -> Self {
        Self {
            code: request.code,
            name: request.name,
            city: request.city,
            country: request.country,
            latitude: request.latitude,
            longitude: request.longitude,
        }
    }
}
