//! 测试套件模块

pub mod gameplay;
pub mod resources;
