//! Message direction classification
//!
//! Assigns each database message a transmit or receive role, or excludes
//! it from the driver. Two policies exist because two generations of
//! database authoring did: newer databases carry an explicit per-message
//! direction attribute, older ones encode direction implicitly through
//! which node sends or receives the message. Under the membership policy
//! the receiver set is checked before the sender set, so a node that both
//! sends and receives a message sees it as received.

use crate::config::DirectionPolicy;
use crate::database::{Database, Message};
use crate::types::{Direction, GeneratorError, Result};

/// Direction attribute value meaning the driver receives the message
const DIRECTION_VALUE_RX: i64 = 0;
/// Direction attribute value meaning the driver transmits the message
const DIRECTION_VALUE_TX: i64 = 1;

/// A message together with its resolved direction
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedMessage<'a> {
    pub message: &'a Message,
    pub direction: Direction,
}

/// Classify every message of the database under the given policy
///
/// The returned list preserves database declaration order. Messages
/// without signals are excluded under either policy; the membership
/// policy additionally excludes messages the node neither sends nor
/// receives. Under the attribute policy a missing or unknown attribute
/// value fails classification.
pub fn classify<'a>(
    database: &'a Database,
    policy: &DirectionPolicy,
) -> Result<Vec<ClassifiedMessage<'a>>> {
    let mut classified = Vec::with_capacity(database.messages.len());

    for message in &database.messages {
        if message.signals.is_empty() {
            log::debug!("Excluding message '{}': no signals", message.name);
            continue;
        }

        let direction = match policy {
            DirectionPolicy::Attribute => classify_by_attribute(message)?,
            DirectionPolicy::Membership { node } => {
                match classify_by_membership(message, node) {
                    Some(direction) => direction,
                    None => {
                        log::debug!(
                            "Excluding message '{}': node '{}' neither sends nor receives it",
                            message.name,
                            node
                        );
                        continue;
                    }
                }
            }
        };

        log::trace!("Message '{}' classified as {}", message.name, direction);
        classified.push(ClassifiedMessage { message, direction });
    }

    Ok(classified)
}

fn classify_by_attribute(message: &Message) -> Result<Direction> {
    match message.direction_attr {
        Some(DIRECTION_VALUE_RX) => Ok(Direction::Rx),
        Some(DIRECTION_VALUE_TX) => Ok(Direction::Tx),
        value => Err(GeneratorError::UnclassifiedMessage {
            message: message.name.clone(),
            value,
        }),
    }
}

fn classify_by_membership(message: &Message, node: &str) -> Option<Direction> {
    if message.receivers.iter().any(|n| n == node) {
        Some(Direction::Rx)
    } else if message.senders.iter().any(|n| n == node) {
        Some(Direction::Tx)
    } else {
        None
    }
}
