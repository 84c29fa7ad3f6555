//! Message model -> entity mapper

use pulse_core::{
    DomainError, MessageId, MessageRecord, MessageTarget, PrincipalId, RoomId, SenderSummary,
};

use crate::models::MessageModel;

/// Convert a joined message row to a `MessageRecord`
///
/// Fails only if the row violates the exclusive-target constraint, which the
/// schema rules out.
impl TryFrom<MessageModel> for MessageRecord {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let target = match (model.receiver_id, model.room_id) {
            (Some(receiver_id), None) => MessageTarget::direct(PrincipalId::new(receiver_id)),
            (None, Some(room_id)) => MessageTarget::room(RoomId::new(room_id)),
            _ => {
                return Err(DomainError::InternalError(format!(
                    "message {} has an invalid target",
                    model.id
                )))
            }
        };

        Ok(MessageRecord {
            id: MessageId::new(model.id),
            sender: SenderSummary {
                id: PrincipalId::new(model.sender_id),
                handle: model.sender_handle,
                display_name: model.sender_display_name,
            },
            target,
            content: model.content,
            created_at: model.created_at,
            is_read: model.is_read,
        })
    }
}
