use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Epoch used as the zero point for the timestamp component, matching the
/// reference implementation's Snowflake layout: 2024-12-18T09:00:00Z in
/// milliseconds.
const BASE_EPOCH_MS: i64 = 1_734_512_400_000;
const NODE_BITS: i64 = 10;
const SEQUENCE_BITS: i64 = 12;
const MAX_SEQUENCE: i64 = (1 << SEQUENCE_BITS) - 1;
const MAX_NODE: i64 = (1 << NODE_BITS) - 1;

struct State {
    last_ms: i64,
    sequence: i64,
}

/// Monotonic, unique string-id generator (C1): `(ms_since_epoch -
/// BASE_EPOCH_MS) << 22 | node_id << 12 | sequence`. Spins on clock
/// regression and on sequence exhaustion within the same millisecond rather
/// than ever emitting a decreasing id.
pub struct SnowflakeIdGenerator {
    node_id: i64,
    state: Mutex<State>,
}

impl SnowflakeIdGenerator {
    pub fn new(node_id: u16) -> Self {
        Self {
            node_id: (node_id as i64) & MAX_NODE,
            state: Mutex::new(State {
                last_ms: 0,
                sequence: 0,
            }),
        }
    }

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX_EPOCH")
            .as_millis() as i64
    }

    /// Generates the next id as a decimal string.
    pub fn next_id(&self) -> String {
        let mut state = self.state.lock().expect("id generator mutex poisoned");
        let mut now = Self::now_ms();

        loop {
            if now < state.last_ms {
                // Clock moved backward: spin until it catches back up rather
                // than regress the id.
                now = Self::now_ms();
                continue;
            }

            if now == state.last_ms {
                state.sequence = (state.sequence + 1) & MAX_SEQUENCE;
                if state.sequence == 0 {
                    // Sequence exhausted within this millisecond: spin for
                    // the clock to tick over.
                    now = Self::now_ms();
                    continue;
                }
            } else {
                state.sequence = 0;
            }

            state.last_ms = now;
            break;
        }

        let id = ((now - BASE_EPOCH_MS) << (NODE_BITS + SEQUENCE_BITS))
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence;
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_increasing() {
        let gen = SnowflakeIdGenerator::new(1);
        let mut seen = HashSet::new();
        let mut prev: i64 = 0;
        for _ in 0..5_000 {
            let id_str = gen.next_id();
            let id: i64 = id_str.parse().unwrap();
            assert!(id > prev, "ids must strictly increase");
            assert!(seen.insert(id_str), "ids must be unique");
            prev = id;
        }
    }
}
