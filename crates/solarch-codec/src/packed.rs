//! Packed block records: every string leaf replaced by a dictionary reference.
//!
//! The field layout mirrors [`crate::block`] one to one, which keeps the
//! MessagePack shape `{ encodedKeys: [...], blocks: [...] }` stable.

use serde::{Deserialize, Serialize};

/// Reference to an entry of the batch dictionary, `{ "i": index }` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyRef {
    /// Zero-based dictionary index.
    pub i: u32,
}

impl KeyRef {
    /// Create a reference to dictionary entry `i`.
    pub const fn new(i: u32) -> Self {
        Self { i }
    }

    /// Index as usize.
    pub fn index(self) -> usize {
        self.i as usize
    }
}

/// How the bytes of an [`EncodedKey`] map back to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyEncoding {
    /// Bytes are the Base58 decoding of the string.
    Base58 = 0,
    /// Bytes are the UTF-8 encoding of the string.
    Utf8 = 1,
}

impl KeyEncoding {
    /// Wire tag of this encoding.
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// One dictionary entry as stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedKey {
    /// Encoded string bytes.
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
    /// Raw encoding tag; see [`KeyEncoding`].
    #[serde(rename = "type")]
    pub kind: u8,
}

impl EncodedKey {
    /// Build an entry with a known encoding.
    pub fn new(data: Vec<u8>, encoding: KeyEncoding) -> Self {
        Self {
            data,
            kind: encoding.tag(),
        }
    }
}

/// A batch of packed blocks sharing one dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedBlockList {
    /// Distinct strings of the batch in first-seen order.
    pub encoded_keys: Vec<EncodedKey>,
    /// Packed blocks.
    pub blocks: Vec<PackedBlock>,
}

impl PackedBlockList {
    /// Lowest and highest block height in the batch.
    pub fn height_range(&self) -> Option<(u64, u64)> {
        let mut heights = self.blocks.iter().map(|b| b.header.height);
        let first = heights.next()?;
        Some(heights.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }

    /// Total number of transactions in the batch.
    pub fn transaction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.transactions.len()).sum()
    }
}

/// Packed [`crate::Block`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedBlock {
    /// Block header.
    pub header: PackedBlockHeader,
    /// Transactions.
    pub transactions: Vec<PackedTransaction>,
    /// Instructions.
    pub instructions: Vec<PackedInstruction>,
    /// Log messages.
    pub logs: Vec<PackedLogMessage>,
    /// Balance changes.
    pub balances: Vec<PackedBalance>,
    /// Token balance changes.
    pub token_balances: Vec<PackedTokenBalance>,
    /// Rewards.
    pub rewards: Vec<PackedReward>,
}

/// Packed [`crate::BlockHeader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedBlockHeader {
    /// Block hash.
    pub hash: KeyRef,
    /// Block height.
    pub height: u64,
    /// Slot number.
    pub slot: u64,
    /// Parent slot.
    pub parent_slot: u64,
    /// Parent hash.
    pub parent_hash: KeyRef,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
}

/// Packed [`crate::AddressTableLookup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedAddressTableLookup {
    /// Lookup table account.
    pub account_key: KeyRef,
    /// Read-only indexes.
    pub readonly_indexes: Vec<u32>,
    /// Writable indexes.
    pub writable_indexes: Vec<u32>,
}

/// Packed [`crate::LoadedAddresses`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedLoadedAddresses {
    /// Read-only loaded accounts.
    pub readonly: Vec<KeyRef>,
    /// Writable loaded accounts.
    pub writable: Vec<KeyRef>,
}

/// Packed [`crate::Transaction`] after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedTransaction {
    /// Position in block.
    pub transaction_index: u32,
    /// Version number, `-1` for legacy.
    pub version: i64,
    /// Static account keys.
    pub account_keys: Vec<KeyRef>,
    /// Lookup tables.
    pub address_table_lookups: Vec<PackedAddressTableLookup>,
    /// Header: read-only signed accounts.
    pub num_readonly_signed_accounts: u32,
    /// Header: read-only unsigned accounts.
    pub num_readonly_unsigned_accounts: u32,
    /// Header: required signatures.
    pub num_required_signatures: u32,
    /// Recent blockhash.
    pub recent_blockhash: KeyRef,
    /// Signatures.
    pub signatures: Vec<KeyRef>,
    /// Compact JSON error text, empty on success.
    pub err: KeyRef,
    /// Compute units consumed.
    #[serde(with = "crate::decimal")]
    pub compute_units_consumed: u64,
    /// Fee in lamports.
    #[serde(with = "crate::decimal")]
    pub fee: u64,
    /// Loaded addresses.
    pub loaded_addresses: PackedLoadedAddresses,
    /// Log truncation flag.
    pub has_dropped_log_messages: bool,
}

/// Packed [`crate::Instruction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedInstruction {
    /// Owning transaction.
    pub transaction_index: u32,
    /// Invocation path.
    pub instruction_address: Vec<u32>,
    /// Program.
    pub program_id: KeyRef,
    /// Accounts.
    pub accounts: Vec<KeyRef>,
    /// Instruction data.
    pub data: KeyRef,
    /// Compute units consumed.
    #[serde(default, with = "crate::decimal::option", skip_serializing_if = "Option::is_none")]
    pub compute_units_consumed: Option<u64>,
    /// Error text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<KeyRef>,
    /// Commit flag.
    pub is_committed: bool,
    /// Log truncation flag.
    pub has_dropped_log_messages: bool,
}

/// Packed [`crate::LogMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedLogMessage {
    /// Owning transaction.
    pub transaction_index: u32,
    /// Line position.
    pub log_index: u32,
    /// Emitting instruction.
    pub instruction_address: Vec<u32>,
    /// Emitting program.
    pub program_id: KeyRef,
    /// Kind text (`log`, `data`, `other`).
    pub kind: KeyRef,
    /// Payload.
    pub message: KeyRef,
}

/// Packed [`crate::Balance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedBalance {
    /// Owning transaction.
    pub transaction_index: u32,
    /// Account.
    pub account: KeyRef,
    /// Lamports before.
    #[serde(with = "crate::decimal")]
    pub pre: u64,
    /// Lamports after.
    #[serde(with = "crate::decimal")]
    pub post: u64,
}

/// Packed [`crate::TokenBalanceRecord`] (flat, all sides optional).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedTokenBalance {
    /// Owning transaction.
    pub transaction_index: u32,
    /// Token account.
    pub account: KeyRef,
    /// Pre-side program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_program_id: Option<KeyRef>,
    /// Pre-side mint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_mint: Option<KeyRef>,
    /// Pre-side decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_decimals: Option<u8>,
    /// Pre-side owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_owner: Option<KeyRef>,
    /// Pre-side amount.
    #[serde(default, with = "crate::decimal::option", skip_serializing_if = "Option::is_none")]
    pub pre_amount: Option<u64>,
    /// Post-side program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_program_id: Option<KeyRef>,
    /// Post-side mint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_mint: Option<KeyRef>,
    /// Post-side decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_decimals: Option<u8>,
    /// Post-side owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_owner: Option<KeyRef>,
    /// Post-side amount.
    #[serde(default, with = "crate::decimal::option", skip_serializing_if = "Option::is_none")]
    pub post_amount: Option<u64>,
}

/// Packed [`crate::Reward`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedReward {
    /// Rewarded account.
    pub pubkey: KeyRef,
    /// Reward amount.
    #[serde(with = "crate::decimal")]
    pub lamports: i64,
    /// Balance after reward.
    #[serde(with = "crate::decimal")]
    pub post_balance: u64,
    /// Reward type text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_type: Option<KeyRef>,
    /// Commission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission: Option<u8>,
}
