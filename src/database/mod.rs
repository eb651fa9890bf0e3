pub mod chapter;
pub mod common;
pub mod novel;
pub mod tag;
pub mod translator;
