use crate::application::requests::CarRequest;
use crate::error::{Result, ServiceError};
use std::io::Read;

/// Reads a fleet seed from a CSV source with the columns
/// `model, brand, type, inventory, daily_fee`.
///
/// Whitespace around fields is trimmed. Each row comes out as a
/// [`CarRequest`], still to be validated by the fleet service.
pub struct FleetReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> FleetReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes the rows, one result per row.
    pub fn cars(self) -> impl Iterator<Item = Result<CarRequest>> {
        self.reader
            .into_deserialize::<CarRequest>()
            .map(|result| result.map_err(ServiceError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::car::CarType;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "model, brand, type, inventory, daily_fee\n\
                    Golf, VW, HATCHBACK, 3, 40.99\n\
                    X5, BMW, SUV, 1, 120";
        let cars: Vec<Result<CarRequest>> = FleetReader::new(data.as_bytes()).cars().collect();

        assert_eq!(cars.len(), 2);
        let golf = cars[0].as_ref().unwrap();
        assert_eq!(golf.model, "Golf");
        assert_eq!(golf.r#type, CarType::Hatchback);
        assert_eq!(golf.inventory, 3);
        assert_eq!(golf.daily_fee, dec!(40.99));
        assert_eq!(cars[1].as_ref().unwrap().r#type, CarType::Suv);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "model, brand, type, inventory, daily_fee\nGolf, VW, TRUCK, 3, 40.99";
        let cars: Vec<Result<CarRequest>> = FleetReader::new(data.as_bytes()).cars().collect();

        assert!(matches!(cars[0], Err(ServiceError::Csv(_))));
    }
}
