pub mod fleet_reader;
pub mod fleet_writer;
