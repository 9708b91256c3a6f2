#![warn(missing_docs)]

//! solarch packed-block codec: string dictionary packing of Solana blocks
//!
//! Pack path:   Block → Normalize → Intern strings → PackedBlockList
//! Unpack path: PackedBlockList → Decode dictionary → Resolve keys → Denormalize → Block

pub mod block;
pub mod decimal;
pub mod dictionary;
pub mod error;
pub mod normalize;
pub mod pack;
pub mod packed;
pub mod value;

#[cfg(test)]
pub(crate) mod fixtures;

pub use block::{
    AddressTableLookup, Balance, Block, BlockHeader, Instruction, LoadedAddresses, LogKind,
    LogMessage, Reward, TokenAmount, TokenBalance, TokenBalanceRecord, Transaction,
    TransactionVersion,
};
pub use dictionary::{decode_key, encode_key, Interner, KeyTable};
pub use error::{CodecError, CodecResult};
pub use pack::{pack_blocks, unpack_blocks, Pack};
pub use packed::{
    EncodedKey, KeyEncoding, KeyRef, PackedBlock, PackedBlockList, PackedTransaction,
};
pub use value::{from_safe, to_safe, Value};
