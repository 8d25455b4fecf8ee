pub mod logs;
pub mod power;
pub mod telemetry;
pub mod voltages;
