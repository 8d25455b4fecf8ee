pub mod logs;
pub mod power;
pub mod recording;
pub mod telemetry;
pub mod voltages;
