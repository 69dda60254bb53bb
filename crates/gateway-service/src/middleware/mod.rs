//! 网关中间件

pub mod session;

pub use session::{CookieSettings, SESSION_COOKIE, SessionContext, session_guard};
