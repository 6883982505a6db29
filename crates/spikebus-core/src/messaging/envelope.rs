//! Self-describing byte envelopes for external message transport
//!
//! Layout: one kind-tag byte followed by the payload in fixed-width
//! little-endian fields. `SpikeMessage` is `{uid:16, step:u64, n:u32,
//! indexes:[u32;n]}`; `SynapticImpactMessage` is `{uid:16, step:u64,
//! target:16, n:u32, impacts:[{pre:u32, post:u32, value:f32, kind:u8};n]}`.

use crate::error::{CoreError, Result};
use crate::messaging::{
    ImpactKind, MessageVariant, SpikeMessage, SynapticImpact, SynapticImpactMessage,
};
use crate::uid::Uid;

const TAG_SPIKE: u8 = 0;
const TAG_SYNAPTIC_IMPACT: u8 = 1;

/// Serialize a message into a self-describing byte envelope.
pub fn pack_to_envelope(message: &MessageVariant) -> Vec<u8> {
    match message {
        MessageVariant::Spike(m) => {
            let mut bytes = Vec::with_capacity(1 + 16 + 8 + 4 + 4 * m.neuron_indexes.len());
            bytes.push(TAG_SPIKE);
            bytes.extend_from_slice(m.sender_uid.as_bytes());
            bytes.extend_from_slice(&m.send_time.to_le_bytes());
            bytes.extend_from_slice(&(m.neuron_indexes.len() as u32).to_le_bytes());
            for index in &m.neuron_indexes {
                bytes.extend_from_slice(&index.to_le_bytes());
            }
            bytes
        }
        MessageVariant::SynapticImpact(m) => {
            let mut bytes = Vec::with_capacity(1 + 16 + 8 + 16 + 4 + 13 * m.impacts.len());
            bytes.push(TAG_SYNAPTIC_IMPACT);
            bytes.extend_from_slice(m.sender_uid.as_bytes());
            bytes.extend_from_slice(&m.send_time.to_le_bytes());
            bytes.extend_from_slice(m.postsynaptic_uid.as_bytes());
            bytes.extend_from_slice(&(m.impacts.len() as u32).to_le_bytes());
            for impact in &m.impacts {
                bytes.extend_from_slice(&impact.pre_index.to_le_bytes());
                bytes.extend_from_slice(&impact.post_index.to_le_bytes());
                bytes.extend_from_slice(&impact.value.to_le_bytes());
                bytes.push(impact.kind.code());
            }
            bytes
        }
    }
}

/// Deserialize a byte envelope produced by [`pack_to_envelope`].
pub fn extract_from_envelope(buffer: &[u8]) -> Result<MessageVariant> {
    let mut cursor = Cursor::new(buffer);
    let tag = cursor.read_u8()?;
    match tag {
        TAG_SPIKE => {
            let sender_uid = cursor.read_uid()?;
            let send_time = cursor.read_u64()?;
            let count = cursor.read_u32()? as usize;
            let mut neuron_indexes = Vec::with_capacity(count);
            for _ in 0..count {
                neuron_indexes.push(cursor.read_u32()?);
            }
            Ok(MessageVariant::Spike(SpikeMessage {
                sender_uid,
                send_time,
                neuron_indexes,
            }))
        }
        TAG_SYNAPTIC_IMPACT => {
            let sender_uid = cursor.read_uid()?;
            let send_time = cursor.read_u64()?;
            let postsynaptic_uid = cursor.read_uid()?;
            let count = cursor.read_u32()? as usize;
            let mut impacts = Vec::with_capacity(count);
            for _ in 0..count {
                let pre_index = cursor.read_u32()?;
                let post_index = cursor.read_u32()?;
                let value = cursor.read_f32()?;
                let kind = ImpactKind::from_code(cursor.read_u8()?)?;
                impacts.push(SynapticImpact {
                    pre_index,
                    post_index,
                    value,
                    kind,
                });
            }
            Ok(MessageVariant::SynapticImpact(SynapticImpactMessage {
                sender_uid,
                send_time,
                postsynaptic_uid,
                impacts,
            }))
        }
        _ => Err(CoreError::UnknownMessageKind { tag }),
    }
}

/// Bounds-checked reader over an envelope buffer.
struct Cursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let remaining = self.buffer.len() - self.position;
        if remaining < count {
            return Err(CoreError::EnvelopeTruncated {
                offset: self.position,
                needed: count - remaining,
            });
        }
        let slice = &self.buffer[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(bytes))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.take(4)?);
        Ok(f32::from_le_bytes(bytes))
    }

    fn read_uid(&mut self) -> Result<Uid> {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(self.take(16)?);
        Ok(Uid::from_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_impact(i: u32) -> SynapticImpact {
        SynapticImpact {
            pre_index: i,
            post_index: i + 1,
            value: 0.25 * i as f32,
            kind: ImpactKind::Excitatory,
        }
    }

    #[test]
    fn test_spike_round_trip() {
        let message = MessageVariant::Spike(SpikeMessage {
            sender_uid: Uid::new(),
            send_time: 42,
            neuron_indexes: vec![0, 7, 99],
        });
        let bytes = pack_to_envelope(&message);
        assert_eq!(extract_from_envelope(&bytes).unwrap(), message);
    }

    #[test]
    fn test_impact_round_trip_empty() {
        let message = MessageVariant::SynapticImpact(SynapticImpactMessage {
            sender_uid: Uid::new(),
            send_time: 0,
            postsynaptic_uid: Uid::new(),
            impacts: vec![],
        });
        let bytes = pack_to_envelope(&message);
        assert_eq!(extract_from_envelope(&bytes).unwrap(), message);
    }

    #[test]
    fn test_impact_round_trip_large() {
        let message = MessageVariant::SynapticImpact(SynapticImpactMessage {
            sender_uid: Uid::new(),
            send_time: u64::MAX,
            postsynaptic_uid: Uid::new(),
            impacts: (0..1000).map(sample_impact).collect(),
        });
        let bytes = pack_to_envelope(&message);
        assert_eq!(extract_from_envelope(&bytes).unwrap(), message);
    }

    #[test]
    fn test_truncated_envelope() {
        let message = MessageVariant::Spike(SpikeMessage {
            sender_uid: Uid::new(),
            send_time: 1,
            neuron_indexes: vec![1, 2, 3],
        });
        let bytes = pack_to_envelope(&message);
        let err = extract_from_envelope(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(err, CoreError::EnvelopeTruncated { .. }));
    }

    #[test]
    fn test_unknown_tag() {
        let err = extract_from_envelope(&[0xFF]).unwrap_err();
        assert!(matches!(err, CoreError::UnknownMessageKind { tag: 0xFF }));
    }

    #[test]
    fn test_empty_buffer() {
        assert!(extract_from_envelope(&[]).is_err());
    }
}
