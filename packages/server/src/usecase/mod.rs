//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層の trait を通じてストアとトランスポートを操作します。

pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod relay_message;

pub use error::{DispatchError, JoinError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use relay_message::{
    FanoutReport, MessageEvent, Rejection, RelayMessageUseCase, RelayOutcome, RequestContext,
};
