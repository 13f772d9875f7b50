//! UseCase: メッセージ中継（ファンアウト）処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//! - ペイロード検証、送信者解決、ルームメンバー解決、送信者除外、並行配信、集約
//!
//! ### なぜこのテストが必要か
//! - 送信者自身には決してメッセージが戻らないことを保証
//! - 一部の宛先への配信失敗が他の宛先への配信を妨げないことを保証
//! - 不正な入力・未参加の送信者はエラーエンベロープで応答され、リクエスト自体は成功することを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム内の他メンバー全員への配信
//! - 異常系：message 欠落、未参加の送信者、ストア障害、配信タスクの異常終了
//! - エッジケース：送信者しかいないルーム、部分的な配信失敗、複数ルームの同時配信

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::domain::{
    ConnectionId, ConnectionRegistry, DeliveryChannel, DeliveryError, DeliveryTransport, Endpoint,
    InboundMessage, OutboundEnvelope, RoomIndex,
};

use super::error::DispatchError;

/// Sender-side context of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Connection the request arrived on
    pub connection_id: ConnectionId,
    /// Transport endpoint replies and fan-out are routed through
    pub endpoint: Endpoint,
}

/// One inbound message event: the raw request body plus its caller context.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub body: String,
    pub context: RequestContext,
}

/// Requests answered with an error envelope instead of a fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Body is malformed or carries no `message`
    MissingMessage,
    /// Sender has no session in the registry
    NotJoined,
}

impl Rejection {
    /// Text of the error envelope sent back to the sender.
    pub fn reply(&self) -> &'static str {
        match self {
            Self::MissingMessage => "You need a 'message' on message actions",
            Self::NotJoined => "You need to connect or join a room",
        }
    }
}

/// Per-request tally of a fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Delivery attempts issued (room members minus the sender)
    pub attempted: usize,
    pub delivered: usize,
    /// Recipients whose delivery failed, with the reason
    pub failed: Vec<(ConnectionId, DeliveryError)>,
    /// Stale sessions removed from the registry after the fan-out
    pub pruned: usize,
}

/// Result of a request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// An error envelope was sent to the sender; nothing was fanned out
    Rejected(Rejection),
    /// The message was fanned out to the sender's room
    Relayed(FanoutReport),
}

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    room_index: Arc<dyn RoomIndex>,
    transport: Arc<dyn DeliveryTransport>,
    /// 配信失敗（Gone）の宛先をレジストリから削除するか
    prune_stale: bool,
}

impl RelayMessageUseCase {
    /// 新しい RelayMessageUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        room_index: Arc<dyn RoomIndex>,
        transport: Arc<dyn DeliveryTransport>,
    ) -> Self {
        Self {
            registry,
            room_index,
            transport,
            prune_stale: false,
        }
    }

    /// 配信先が既に切断されていた場合にセッションを削除するかを設定
    pub fn with_stale_pruning(mut self, enabled: bool) -> Self {
        self.prune_stale = enabled;
        self
    }

    /// メッセージ中継を実行
    ///
    /// # Returns
    ///
    /// * `Ok(RelayOutcome::Rejected(_))` - 送信者にエラーエンベロープを返した
    /// * `Ok(RelayOutcome::Relayed(_))` - ルームの他メンバーへ配信した（個別の失敗を含む）
    /// * `Err(DispatchError)` - ストア障害など、想定外の失敗
    pub async fn execute(&self, event: MessageEvent) -> Result<RelayOutcome, DispatchError> {
        let MessageEvent { body, context } = event;
        let channel = self.transport.channel(&context.endpoint);

        // 1. ペイロード検証
        let inbound = match InboundMessage::parse(&body) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::debug!("Rejecting payload from '{}': {}", context.connection_id, e);
                return self
                    .reject(channel.as_ref(), &context.connection_id, Rejection::MissingMessage)
                    .await;
            }
        };

        // 2. 送信者の解決
        let Some(sender) = self.registry.get(&context.connection_id).await? else {
            tracing::debug!("'{}' sent a message before joining", context.connection_id);
            return self
                .reject(channel.as_ref(), &context.connection_id, Rejection::NotJoined)
                .await;
        };

        // 3. ルームメンバーの解決
        let members = self.room_index.query(&sender.room_code).await?;

        // 4. 送信者を除外
        let recipients: Vec<ConnectionId> = members
            .into_iter()
            .filter(|member| !member.is_connection(&sender.connection_id))
            .map(|member| member.connection_id)
            .collect();

        // 5. 並行配信 / 6. 集約
        let envelope = Arc::new(OutboundEnvelope::chat(
            inbound.message.into_string(),
            sender.name.as_str(),
        ));
        let mut report = fan_out(channel, envelope, recipients).await?;

        tracing::info!(
            "Relayed message from '{}' in room '{}': {}/{} delivered",
            sender.connection_id,
            sender.room_code,
            report.delivered,
            report.attempted
        );

        if self.prune_stale {
            report.pruned = self.prune(&report.failed).await;
        }

        Ok(RelayOutcome::Relayed(report))
    }

    async fn reject(
        &self,
        channel: &dyn DeliveryChannel,
        sender: &ConnectionId,
        rejection: Rejection,
    ) -> Result<RelayOutcome, DispatchError> {
        channel
            .send(sender, &OutboundEnvelope::error(rejection.reply()))
            .await
            .map_err(DispatchError::ErrorReply)?;
        Ok(RelayOutcome::Rejected(rejection))
    }

    /// Gone で失敗した宛先のセッションを削除し、削除件数を返す
    async fn prune(&self, failed: &[(ConnectionId, DeliveryError)]) -> usize {
        let mut pruned = 0;
        for (connection_id, error) in failed {
            if !matches!(error, DeliveryError::Gone(_)) {
                continue;
            }
            match self.registry.remove(connection_id).await {
                Ok(Some(_)) => {
                    tracing::info!("Pruned stale connection '{}'", connection_id);
                    pruned += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to prune stale connection '{}': {}", connection_id, e);
                }
            }
        }
        pruned
    }
}

/// Deliver `envelope` to every recipient concurrently and wait for all of them.
///
/// A failed delivery is recorded and never cancels its siblings. An aborted
/// task fails the whole batch, but only after every other task has settled.
async fn fan_out(
    channel: Arc<dyn DeliveryChannel>,
    envelope: Arc<OutboundEnvelope>,
    recipients: Vec<ConnectionId>,
) -> Result<FanoutReport, DispatchError> {
    let mut deliveries = JoinSet::new();
    for recipient in recipients {
        let channel = Arc::clone(&channel);
        let envelope = Arc::clone(&envelope);
        deliveries.spawn(async move {
            let result = channel.send(&recipient, &envelope).await;
            (recipient, result)
        });
    }

    let mut report = FanoutReport {
        attempted: deliveries.len(),
        ..FanoutReport::default()
    };
    let mut aborted = Vec::new();

    while let Some(joined) = deliveries.join_next().await {
        match joined {
            Ok((_, Ok(()))) => report.delivered += 1,
            Ok((recipient, Err(e))) => {
                tracing::warn!("Failed to deliver message to '{}': {}", recipient, e);
                report.failed.push((recipient, e));
            }
            Err(e) => aborted.push(e.to_string()),
        }
    }

    if !aborted.is_empty() {
        return Err(DispatchError::DeliveryTask(aborted.join("; ")));
    }
    Ok(report)
}
