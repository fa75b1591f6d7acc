//! API 서버 유틸리티 함수.

pub mod sanitize;

pub use sanitize::{escape_html, sanitize_field};
