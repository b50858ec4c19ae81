pub mod energy_table;

pub use energy_table::EnergyTableSink;
