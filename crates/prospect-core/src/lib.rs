//! # PROSPECT Core
//!
//! 标注系统的核心模块，提供解剖分区值类型、错误定义和通用工具。

pub mod error;
pub mod models;
pub mod utils;

pub use error::{LabelError, Result};
pub use models::*;
