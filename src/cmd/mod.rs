pub mod batch;
pub mod blocks;
pub mod convert;
pub mod html;
pub mod import;
pub mod output;
