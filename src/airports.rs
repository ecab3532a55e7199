use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// An airport that flights depart from or arrive at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: i32,
    /// Three-letter airport code, unique across all airports
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Airport {
    /// Label used in selection lists, e.g. "LIS - Humberto Delgado (Lisbon)"
    pub fn display_label(&self) -> String {
        format!("{} - {} ({})", self.code, self.name, self.city)
    }

    /// Overwrite the user-editable fields from an input record
    pub fn apply(&mut self, input: &AirportInput) {
        self.code = input.code.clone();
        self.name = input.name.clone();
        self.city = input.city.clone();
        self.country = input.country.clone();
        self.latitude = input.latitude;
        self.longitude = input.longitude;
    }
}

/// User-supplied airport fields for create and update requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportInput {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Diesel model for the airports table
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::airports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AirportModel {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert model for new airports
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::airports)]
pub struct NewAirportModel {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

/// Changeset applied when an existing airport is edited
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::airports)]
pub struct AirportChangeset {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<AirportModel> for Airport {
    fn from(model: AirportModel) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            city: model.city,
            country: model.country,
            latitude: model.latitude,
            longitude: model.longitude,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<AirportInput> for NewAirportModel {
    fn from(input: AirportInput) -> Self {
        Self {
            code: input.code,
            name: input.name,
            city: input.city,
            country: input.country,
            latitude: input.latitude,
            longitude: input.longitude,
            created_at: Utc::now(),
        }
    }
}

impl From<&Airport> for AirportChangeset {
    fn from(airport: &Airport) -> Self {
        Self {
            code: airport.code.clone(),
            name: airport.name.clone(),
            city: airport.city.clone(),
            country: airport.country.clone(),
            latitude: airport.latitude,
            longitude: airport.longitude,
            updated_at: airport.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lisbon() -> Airport {
        Airport {
            id: 1,
            code: "LIS".to_string(),
            name: "Humberto Delgado".to_string(),
            city: "Lisbon".to_string(),
            country: "Portugal".to_string(),
            latitude: 38.7742,
            longitude: -9.1342,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_display_label() {
        assert_eq!(lisbon().display_label(), "LIS - Humberto Delgado (Lisbon)");
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut airport = lisbon();
        let created_at = airport.created_at;
        airport.apply(&AirportInput {
            code: "OPO".to_string(),
            name: "Francisco Sa Carneiro".to_string(),
            city: "Porto".to_string(),
            country: "Portugal".to_string(),
            latitude: 41.2481,
            longitude: -8.6814,
        });

        assert_eq!(airport.id, 1);
        assert_eq!(airport.created_at, created_at);
        assert_eq!(airport.code, "OPO");
        assert_eq!(airport.latitude, 41.2481);
    }
}
