use std::collections::HashMap;

use crate::core::delivery::DeliveryRow;

/// Delivery rows grouped by head plate.
///
/// Each bucket keeps the rows in delivery-table order, so scanning a bucket
/// yields candidates in the same order as scanning the whole table.
pub struct DeliveryIndex<'a> {
    by_plate: HashMap<&'a str, Vec<&'a DeliveryRow>>,
}

impl<'a> DeliveryIndex<'a> {
    pub fn new(deliveries: &'a [DeliveryRow]) -> Self {
        let mut by_plate: HashMap<&'a str, Vec<&'a DeliveryRow>> = HashMap::new();

        for row in deliveries {
            // Rows without a plate can never satisfy a rule
            if let Some(plate) = row.head_plate.as_deref() {
                by_plate.entry(plate).or_default().push(row);
            }
        }

        Self { by_plate }
    }

    /// All deliveries with exactly this head plate, in table order
    #[must_use]
    pub fn rows_for_plate(&self, plate: &str) -> &[&'a DeliveryRow] {
        self.by_plate.get(plate).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct head plates
    #[must_use]
    pub fn plate_count(&self) -> usize {
        self.by_plate.len()
    }
}
