// Domain layer - Measurement records, server names, selection and chart shapes
pub mod chart;
pub mod measurement;
pub mod selection;
pub mod server;
