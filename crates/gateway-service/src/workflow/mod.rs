//! 业务编排流程
//!
//! 所有流程只通过 `ResourceClient` 访问资源服务，不直接接触存储。
//! 除结算流程的逐笔更新外，任一步失败即中止并返回错误。

pub mod gambler;
pub mod login;
pub mod place_bet;
pub mod settlement;

pub use gambler::GamblerQueries;
pub use login::{LoginCommand, LoginOutcome, LoginWorkflow};
pub use place_bet::{PlaceBetCommand, PlaceBetWorkflow};
pub use settlement::{AnswerCommand, AnswerStats, SettlementWorkflow};
