pub mod ads;
pub mod slack;
