use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One delivery trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRow {
    /// Departure date, `None` when the source value could not be parsed
    pub departure_date: Option<NaiveDate>,

    /// Head (tractor) plate, compared verbatim against transaction registrations
    pub head_plate: Option<String>,

    /// Carrier name; repeats across rows of the same trip
    pub carrier: String,

    /// Trip code, always text even when the source cell was numeric
    pub trip_code: String,

    // Carried through from the source table, not used for matching
    pub unload_date: Option<String>,
    pub secondary_carrier: Option<String>,
    pub vehicle_number: Option<String>,
}

impl DeliveryRow {
    pub fn new(
        departure_date: Option<NaiveDate>,
        head_plate: impl Into<String>,
        carrier: impl Into<String>,
        trip_code: impl Into<String>,
    ) -> Self {
        Self {
            departure_date,
            head_plate: Some(head_plate.into()),
            carrier: carrier.into(),
            trip_code: trip_code.into(),
            unload_date: None,
            secondary_carrier: None,
            vehicle_number: None,
        }
    }
}
