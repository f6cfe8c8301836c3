//! Foundation layer: math types shared by every other module

pub mod math;
