//! Canonical Solana block records as produced by the block normalizer upstream.
//!
//! Every string leaf here becomes a dictionary reference in [`crate::packed`].
//! Lamport amounts, fees and compute units use the [`crate::decimal`] encoding.

use crate::error::CodecError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A block with its header and all per-transaction records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Block header.
    pub header: BlockHeader,
    /// Transactions in block order.
    pub transactions: Vec<Transaction>,
    /// Instructions of all transactions, including inner instructions.
    pub instructions: Vec<Instruction>,
    /// Program log messages.
    pub logs: Vec<LogMessage>,
    /// Native SOL balance changes.
    pub balances: Vec<Balance>,
    /// SPL token balance changes.
    pub token_balances: Vec<TokenBalance>,
    /// Rewards paid out in this block.
    pub rewards: Vec<Reward>,
}

/// Block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Base58 block hash.
    pub hash: String,
    /// Block height.
    pub height: u64,
    /// Slot number.
    pub slot: u64,
    /// Slot of the parent block.
    pub parent_slot: u64,
    /// Base58 hash of the parent block.
    pub parent_hash: String,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
}

/// Message format version of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionVersion {
    /// Pre-versioning message format, `"legacy"` on the wire.
    Legacy,
    /// Versioned message format.
    Versioned(u32),
}

impl Serialize for TransactionVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Legacy => serializer.serialize_str("legacy"),
            Self::Versioned(v) => serializer.serialize_u32(*v),
        }
    }
}

impl<'de> Deserialize<'de> for TransactionVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(Self::Versioned(v)),
            Repr::Text(s) if s == "legacy" => Ok(Self::Legacy),
            Repr::Text(s) => Err(serde::de::Error::custom(format!(
                "unknown transaction version {s:?}"
            ))),
        }
    }
}

/// An address lookup table referenced by a versioned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressTableLookup {
    /// Lookup table account.
    pub account_key: String,
    /// Indexes of read-only accounts in the table.
    pub readonly_indexes: Vec<u32>,
    /// Indexes of writable accounts in the table.
    pub writable_indexes: Vec<u32>,
}

/// Accounts loaded through address lookup tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedAddresses {
    /// Read-only loaded accounts.
    pub readonly: Vec<String>,
    /// Writable loaded accounts.
    pub writable: Vec<String>,
}

/// A transaction with its execution metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Position of the transaction in the block.
    pub transaction_index: u32,
    /// Message version.
    pub version: TransactionVersion,
    /// Static account keys of the message.
    pub account_keys: Vec<String>,
    /// Address lookup tables used by the message.
    pub address_table_lookups: Vec<AddressTableLookup>,
    /// Header: read-only signed accounts.
    pub num_readonly_signed_accounts: u32,
    /// Header: read-only unsigned accounts.
    pub num_readonly_unsigned_accounts: u32,
    /// Header: required signatures.
    pub num_required_signatures: u32,
    /// Recent blockhash the message was signed against.
    pub recent_blockhash: String,
    /// Base58 signatures.
    pub signatures: Vec<String>,
    /// Execution error as reported by the node, `None` on success.
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    /// Compute units consumed by the whole transaction.
    #[serde(with = "crate::decimal")]
    pub compute_units_consumed: u64,
    /// Fee paid in lamports.
    #[serde(with = "crate::decimal")]
    pub fee: u64,
    /// Accounts loaded from lookup tables.
    pub loaded_addresses: LoadedAddresses,
    /// True if the node truncated log messages.
    pub has_dropped_log_messages: bool,
}

/// A top-level or inner instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    /// Owning transaction.
    pub transaction_index: u32,
    /// Path of the instruction in the invocation tree.
    pub instruction_address: Vec<u32>,
    /// Invoked program.
    pub program_id: String,
    /// Accounts passed to the program.
    pub accounts: Vec<String>,
    /// Base58 instruction data.
    pub data: String,
    /// Compute units consumed, when known.
    #[serde(default, with = "crate::decimal::option", skip_serializing_if = "Option::is_none")]
    pub compute_units_consumed: Option<u64>,
    /// Error text, when the instruction failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// False if the enclosing transaction was rolled back.
    pub is_committed: bool,
    /// True if logs of this instruction were truncated.
    pub has_dropped_log_messages: bool,
}

/// Kind of a program log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// `Program log:` line.
    Log,
    /// `Program data:` line.
    Data,
    /// Anything else.
    Other,
}

impl LogKind {
    /// Wire text of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Data => "data",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(Self::Log),
            "data" => Ok(Self::Data),
            "other" => Ok(Self::Other),
            other => Err(CodecError::InvalidLogKind(other.to_string())),
        }
    }
}

/// A program log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMessage {
    /// Owning transaction.
    pub transaction_index: u32,
    /// Position of the line in the transaction log.
    pub log_index: u32,
    /// Instruction that emitted the line.
    pub instruction_address: Vec<u32>,
    /// Program that emitted the line.
    pub program_id: String,
    /// Line kind.
    pub kind: LogKind,
    /// Line payload.
    pub message: String,
}

/// Native balance change of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// Owning transaction.
    pub transaction_index: u32,
    /// Account address.
    pub account: String,
    /// Lamports before execution.
    #[serde(with = "crate::decimal")]
    pub pre: u64,
    /// Lamports after execution.
    #[serde(with = "crate::decimal")]
    pub post: u64,
}

/// One side (pre or post execution) of a token balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    /// Token program owning the account.
    pub program_id: Option<String>,
    /// Token mint.
    pub mint: String,
    /// Mint decimals.
    pub decimals: u8,
    /// Owner of the token account.
    pub owner: Option<String>,
    /// Raw amount in base units.
    pub amount: u64,
}

/// Token balance change of one token account.
///
/// At least one of `pre`/`post` is present. On the wire both sides are
/// flattened into [`TokenBalanceRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TokenBalanceRecord", into = "TokenBalanceRecord")]
pub struct TokenBalance {
    /// Owning transaction.
    pub transaction_index: u32,
    /// Token account address.
    pub account: String,
    /// Balance before execution, absent for newly created accounts.
    pub pre: Option<TokenAmount>,
    /// Balance after execution, absent for closed accounts.
    pub post: Option<TokenAmount>,
}

/// Flat wire shape of a [`TokenBalance`]; every side field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceRecord {
    /// Owning transaction.
    pub transaction_index: u32,
    /// Token account address.
    pub account: String,
    /// Pre-side token program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_program_id: Option<String>,
    /// Pre-side mint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_mint: Option<String>,
    /// Pre-side decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_decimals: Option<u8>,
    /// Pre-side owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_owner: Option<String>,
    /// Pre-side amount.
    #[serde(default, with = "crate::decimal::option", skip_serializing_if = "Option::is_none")]
    pub pre_amount: Option<u64>,
    /// Post-side token program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_program_id: Option<String>,
    /// Post-side mint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_mint: Option<String>,
    /// Post-side decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_decimals: Option<u8>,
    /// Post-side owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_owner: Option<String>,
    /// Post-side amount.
    #[serde(default, with = "crate::decimal::option", skip_serializing_if = "Option::is_none")]
    pub post_amount: Option<u64>,
}

fn token_side(
    side: &str,
    program_id: Option<String>,
    mint: Option<String>,
    decimals: Option<u8>,
    owner: Option<String>,
    amount: Option<u64>,
) -> Result<Option<TokenAmount>, CodecError> {
    match (mint, decimals, amount) {
        (Some(mint), Some(decimals), Some(amount)) => Ok(Some(TokenAmount {
            program_id,
            mint,
            decimals,
            owner,
            amount,
        })),
        (None, None, None) if program_id.is_none() && owner.is_none() => Ok(None),
        _ => Err(CodecError::InvalidTokenBalance(format!(
            "incomplete {side} side: mint, decimals and amount must all be present"
        ))),
    }
}

impl TryFrom<TokenBalanceRecord> for TokenBalance {
    type Error = CodecError;

    fn try_from(r: TokenBalanceRecord) -> Result<Self, Self::Error> {
        let pre = token_side(
            "pre",
            r.pre_program_id,
            r.pre_mint,
            r.pre_decimals,
            r.pre_owner,
            r.pre_amount,
        )?;
        let post = token_side(
            "post",
            r.post_program_id,
            r.post_mint,
            r.post_decimals,
            r.post_owner,
            r.post_amount,
        )?;
        if pre.is_none() && post.is_none() {
            return Err(CodecError::InvalidTokenBalance(format!(
                "account {} has neither a pre nor a post side",
                r.account
            )));
        }
        Ok(Self {
            transaction_index: r.transaction_index,
            account: r.account,
            pre,
            post,
        })
    }
}

impl From<TokenBalance> for TokenBalanceRecord {
    fn from(b: TokenBalance) -> Self {
        let (pre_program_id, pre_mint, pre_decimals, pre_owner, pre_amount) = match b.pre {
            Some(s) => (s.program_id, Some(s.mint), Some(s.decimals), s.owner, Some(s.amount)),
            None => (None, None, None, None, None),
        };
        let (post_program_id, post_mint, post_decimals, post_owner, post_amount) = match b.post {
            Some(s) => (s.program_id, Some(s.mint), Some(s.decimals), s.owner, Some(s.amount)),
            None => (None, None, None, None, None),
        };
        Self {
            transaction_index: b.transaction_index,
            account: b.account,
            pre_program_id,
            pre_mint,
            pre_decimals,
            pre_owner,
            pre_amount,
            post_program_id,
            post_mint,
            post_decimals,
            post_owner,
            post_amount,
        }
    }
}

/// Reward credited to a validator or staker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    /// Rewarded account.
    pub pubkey: String,
    /// Reward amount; negative for rent debits.
    #[serde(with = "crate::decimal")]
    pub lamports: i64,
    /// Account balance after the reward.
    #[serde(with = "crate::decimal")]
    pub post_balance: u64,
    /// Reward type (fee, rent, staking, voting).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_type: Option<String>,
    /// Vote account commission, for staking/voting rewards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission: Option<u8>,
}

impl Block {
    /// Number of string leaves in this block, counting repeats.
    pub fn string_occurrences(&self) -> usize {
        let txs: usize = self
            .transactions
            .iter()
            .map(|t| {
                // recent_blockhash + err text
                2 + t.account_keys.len()
                    + t.signatures.len()
                    + t.address_table_lookups.len()
                    + t.loaded_addresses.readonly.len()
                    + t.loaded_addresses.writable.len()
            })
            .sum();
        let ixs: usize = self
            .instructions
            .iter()
            .map(|i| 2 + i.accounts.len() + usize::from(i.error.is_some()))
            .sum();
        let tokens: usize = self
            .token_balances
            .iter()
            .map(|b| {
                let side = |s: &Option<TokenAmount>| {
                    s.as_ref().map_or(0, |s| {
                        1 + usize::from(s.program_id.is_some()) + usize::from(s.owner.is_some())
                    })
                };
                1 + side(&b.pre) + side(&b.post)
            })
            .sum();
        let rewards: usize = self
            .rewards
            .iter()
            .map(|r| 1 + usize::from(r.reward_type.is_some()))
            .sum();
        // header hash + parent hash; log program + kind + message; balance account
        2 + txs + ixs + 3 * self.logs.len() + self.balances.len() + tokens + rewards
    }
}
