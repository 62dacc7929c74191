//! Small helpers shared by the progress output

pub mod string;
