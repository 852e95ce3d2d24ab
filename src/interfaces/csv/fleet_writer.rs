use crate::domain::car::CarView;
use crate::error::Result;
use std::io::Write;

/// Writes the fleet as CSV with the header
/// `id,model,brand,type,inventory,daily_fee`.
pub struct FleetWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> FleetWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_fleet(&mut self, cars: impl IntoIterator<Item = CarView>) -> Result<()> {
        for car in cars {
            self.writer.serialize(car)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
