//! 数据模型定义
//!
//! 四类资源实体及其部分更新载荷。实体以 JSON 文档形式持久化，
//! 字段名即文档字段名。

pub mod bet;
pub mod credential;
pub mod enums;
pub mod topic;
pub mod user;

pub use bet::{Bet, BetPatch};
pub use credential::{Credential, CredentialPatch, FirebaseCredential, GoogleCredential};
pub use enums::{BetState, Provider, TopicState};
pub use topic::{Topic, TopicPatch};
pub use user::{User, UserPatch};
