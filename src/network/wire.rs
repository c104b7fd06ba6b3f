//! Wire-format constants.
//!
//! Byte-level framing of these payloads is out of scope for the core — a
//! transport crate owns the actual socket. These constants exist so that a
//! transport implementer and this crate agree on tag values and bit layout
//! without either side guessing.

/// Player-snapshot delta change bitmap bits. A delta payload for one player
/// carries a single byte built from these flags, followed by the changed
/// fields in the order listed here.
pub mod player_bits {
    /// `x` changed; an `f32` follows.
    pub const X: u8 = 0x01;
    /// `y` changed; an `f32` follows.
    pub const Y: u8 = 0x02;
    /// `facing_radians` changed; an `f32` follows.
    pub const FACING: u8 = 0x04;
    /// `health` changed; a `u32` follows.
    pub const HEALTH: u8 = 0x08;
    /// `alive` changed; a `u8` (0/1) follows.
    pub const ALIVE: u8 = 0x10;
    /// New player: every field above follows, in the order listed.
    pub const NEW_PLAYER: u8 = 0xFF;
}

/// Packet header. Transport framing only — the core never constructs or
/// parses these bytes itself.
///
/// Layout: 1 byte type, 2 bytes big-endian sequence, 1 byte payload length.
///
/// The length field is one byte, capping a framed payload at 255 bytes.
/// A `STATE_FULL` packet carrying many player snapshots will exceed that
/// for any non-trivial player count. This crate reproduces the field as
/// specified rather than silently widening it — per the open question, a
/// real transport must either chunk `STATE_FULL` payloads across multiple
/// packets or use a wider length field of its own; that decision belongs
/// to the transport, not here.
pub struct PacketHeader {
    pub packet_type: u8,
    pub sequence: u16,
    pub payload_len: u8,
}

/// Opaque packet type tags. Stable values; consumers outside this crate
/// may depend on them.
pub mod packet_type {
    pub const CONNECT: u8 = 0x01;
    pub const CONNECT_ACK: u8 = 0x02;
    pub const DISCONNECT: u8 = 0x03;
    pub const HEARTBEAT: u8 = 0x04;
    pub const HEARTBEAT_ACK: u8 = 0x05;
    pub const INPUT: u8 = 0x10;
    pub const INPUT_ACK: u8 = 0x11;
    pub const STATE_FULL: u8 = 0x20;
    pub const STATE_DELTA: u8 = 0x21;
    pub const EVENT: u8 = 0x30;
}
