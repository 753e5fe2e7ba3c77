pub mod compile;
pub mod new;
