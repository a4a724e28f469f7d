pub mod encoder;
pub mod string_utils;
