use facet::Facet;
use std::fmt;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Low bits of an id hold a per-process counter; the 16 bits above hold a
/// process prefix. The result stays below 2^53 so ids survive a JSON number.
const COUNTER_BITS: u32 = 37;
const COUNTER_MASK: u64 = (1u64 << COUNTER_BITS) - 1;

fn process_prefix() -> u64 {
    static PREFIX: OnceLock<u64> = OnceLock::new();
    *PREFIX.get_or_init(|| {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0);
        (nanos ^ u64::from(std::process::id())) & 0xFFFF
    })
}

fn next_raw(counter: &AtomicU64) -> u64 {
    // Zero is never handed out, even after the counter wraps.
    let count = (counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK).max(1);
    (process_prefix() << COUNTER_BITS) | count
}

macro_rules! trace_id_type {
    ($(#[$meta:meta])* $name:ident) => {
        #[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[facet(transparent)]
        $(#[$meta])*
        pub struct $name(u64);

        impl $name {
            pub fn next() -> Self {
                static COUNTER: AtomicU64 = AtomicU64::new(1);
                Self(next_raw(&COUNTER))
            }

            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:016x}", self.0)
            }
        }
    };
}

trace_id_type!(
    /// Identifies one span, including the root span of a transaction.
    SpanId
);
trace_id_type!(
    /// Shared by a transaction and every span it owns.
    TraceId
);
