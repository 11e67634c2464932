/// Monotonic millisecond clock used for mutation timestamps
pub mod clock;
