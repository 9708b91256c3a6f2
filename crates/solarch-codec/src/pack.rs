//! Block ⇄ packed block conversion through a per-call dictionary.

use crate::block::{
    AddressTableLookup, Balance, Block, BlockHeader, Instruction, LoadedAddresses, LogMessage,
    Reward, TokenBalance, TokenBalanceRecord, Transaction,
};
use crate::dictionary::{Interner, KeyTable};
use crate::error::CodecResult;
use crate::normalize::{error_from_text, error_to_text, version_from_packed, version_to_packed};
use crate::packed::{
    KeyRef, PackedAddressTableLookup, PackedBalance, PackedBlock, PackedBlockHeader,
    PackedBlockList, PackedInstruction, PackedLoadedAddresses, PackedLogMessage, PackedReward,
    PackedTokenBalance, PackedTransaction,
};
use tracing::{debug, instrument};

/// A record with a packed counterpart whose strings live in a [`KeyTable`].
pub trait Pack: Sized {
    /// Packed representation.
    type Packed;

    /// Replace every string with a dictionary reference.
    fn pack(&self, interner: &mut Interner) -> Self::Packed;

    /// Rebuild the record, resolving references against `keys`.
    fn unpack(packed: &Self::Packed, keys: &KeyTable) -> CodecResult<Self>;
}

impl Pack for String {
    type Packed = KeyRef;

    fn pack(&self, interner: &mut Interner) -> KeyRef {
        interner.intern(self)
    }

    fn unpack(packed: &KeyRef, keys: &KeyTable) -> CodecResult<Self> {
        keys.resolve(*packed).map(str::to_owned)
    }
}

impl<T: Pack> Pack for Vec<T> {
    type Packed = Vec<T::Packed>;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        self.iter().map(|v| v.pack(interner)).collect()
    }

    fn unpack(packed: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        packed.iter().map(|p| T::unpack(p, keys)).collect()
    }
}

impl<T: Pack> Pack for Option<T> {
    type Packed = Option<T::Packed>;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        self.as_ref().map(|v| v.pack(interner))
    }

    fn unpack(packed: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        packed.as_ref().map(|p| T::unpack(p, keys)).transpose()
    }
}

impl Pack for BlockHeader {
    type Packed = PackedBlockHeader;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        PackedBlockHeader {
            hash: self.hash.pack(interner),
            height: self.height,
            slot: self.slot,
            parent_slot: self.parent_slot,
            parent_hash: self.parent_hash.pack(interner),
            timestamp: self.timestamp,
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        Ok(Self {
            hash: String::unpack(&p.hash, keys)?,
            height: p.height,
            slot: p.slot,
            parent_slot: p.parent_slot,
            parent_hash: String::unpack(&p.parent_hash, keys)?,
            timestamp: p.timestamp,
        })
    }
}

impl Pack for AddressTableLookup {
    type Packed = PackedAddressTableLookup;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        PackedAddressTableLookup {
            account_key: self.account_key.pack(interner),
            readonly_indexes: self.readonly_indexes.clone(),
            writable_indexes: self.writable_indexes.clone(),
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        Ok(Self {
            account_key: String::unpack(&p.account_key, keys)?,
            readonly_indexes: p.readonly_indexes.clone(),
            writable_indexes: p.writable_indexes.clone(),
        })
    }
}

impl Pack for LoadedAddresses {
    type Packed = PackedLoadedAddresses;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        PackedLoadedAddresses {
            readonly: self.readonly.pack(interner),
            writable: self.writable.pack(interner),
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        Ok(Self {
            readonly: Vec::unpack(&p.readonly, keys)?,
            writable: Vec::unpack(&p.writable, keys)?,
        })
    }
}

impl Pack for Transaction {
    type Packed = PackedTransaction;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        PackedTransaction {
            transaction_index: self.transaction_index,
            version: version_to_packed(self.version),
            account_keys: self.account_keys.pack(interner),
            address_table_lookups: self.address_table_lookups.pack(interner),
            num_readonly_signed_accounts: self.num_readonly_signed_accounts,
            num_readonly_unsigned_accounts: self.num_readonly_unsigned_accounts,
            num_required_signatures: self.num_required_signatures,
            recent_blockhash: self.recent_blockhash.pack(interner),
            signatures: self.signatures.pack(interner),
            err: interner.intern(&error_to_text(self.err.as_ref())),
            compute_units_consumed: self.compute_units_consumed,
            fee: self.fee,
            loaded_addresses: self.loaded_addresses.pack(interner),
            has_dropped_log_messages: self.has_dropped_log_messages,
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        Ok(Self {
            transaction_index: p.transaction_index,
            version: version_from_packed(p.version)?,
            account_keys: Vec::unpack(&p.account_keys, keys)?,
            address_table_lookups: Vec::unpack(&p.address_table_lookups, keys)?,
            num_readonly_signed_accounts: p.num_readonly_signed_accounts,
            num_readonly_unsigned_accounts: p.num_readonly_unsigned_accounts,
            num_required_signatures: p.num_required_signatures,
            recent_blockhash: String::unpack(&p.recent_blockhash, keys)?,
            signatures: Vec::unpack(&p.signatures, keys)?,
            err: error_from_text(keys.resolve(p.err)?),
            compute_units_consumed: p.compute_units_consumed,
            fee: p.fee,
            loaded_addresses: LoadedAddresses::unpack(&p.loaded_addresses, keys)?,
            has_dropped_log_messages: p.has_dropped_log_messages,
        })
    }
}

impl Pack for Instruction {
    type Packed = PackedInstruction;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        PackedInstruction {
            transaction_index: self.transaction_index,
            instruction_address: self.instruction_address.clone(),
            program_id: self.program_id.pack(interner),
            accounts: self.accounts.pack(interner),
            data: self.data.pack(interner),
            compute_units_consumed: self.compute_units_consumed,
            error: self.error.pack(interner),
            is_committed: self.is_committed,
            has_dropped_log_messages: self.has_dropped_log_messages,
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        Ok(Self {
            transaction_index: p.transaction_index,
            instruction_address: p.instruction_address.clone(),
            program_id: String::unpack(&p.program_id, keys)?,
            accounts: Vec::unpack(&p.accounts, keys)?,
            data: String::unpack(&p.data, keys)?,
            compute_units_consumed: p.compute_units_consumed,
            error: Option::unpack(&p.error, keys)?,
            is_committed: p.is_committed,
            has_dropped_log_messages: p.has_dropped_log_messages,
        })
    }
}

impl Pack for LogMessage {
    type Packed = PackedLogMessage;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        PackedLogMessage {
            transaction_index: self.transaction_index,
            log_index: self.log_index,
            instruction_address: self.instruction_address.clone(),
            program_id: self.program_id.pack(interner),
            kind: interner.intern(self.kind.as_str()),
            message: self.message.pack(interner),
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        Ok(Self {
            transaction_index: p.transaction_index,
            log_index: p.log_index,
            instruction_address: p.instruction_address.clone(),
            program_id: String::unpack(&p.program_id, keys)?,
            kind: keys.resolve(p.kind)?.parse()?,
            message: String::unpack(&p.message, keys)?,
        })
    }
}

impl Pack for Balance {
    type Packed = PackedBalance;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        PackedBalance {
            transaction_index: self.transaction_index,
            account: self.account.pack(interner),
            pre: self.pre,
            post: self.post,
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        Ok(Self {
            transaction_index: p.transaction_index,
            account: String::unpack(&p.account, keys)?,
            pre: p.pre,
            post: p.post,
        })
    }
}

impl Pack for TokenBalance {
    type Packed = PackedTokenBalance;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        let r = TokenBalanceRecord::from(self.clone());
        PackedTokenBalance {
            transaction_index: r.transaction_index,
            account: r.account.pack(interner),
            pre_program_id: r.pre_program_id.pack(interner),
            pre_mint: r.pre_mint.pack(interner),
            pre_decimals: r.pre_decimals,
            pre_owner: r.pre_owner.pack(interner),
            pre_amount: r.pre_amount,
            post_program_id: r.post_program_id.pack(interner),
            post_mint: r.post_mint.pack(interner),
            post_decimals: r.post_decimals,
            post_owner: r.post_owner.pack(interner),
            post_amount: r.post_amount,
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        let record = TokenBalanceRecord {
            transaction_index: p.transaction_index,
            account: String::unpack(&p.account, keys)?,
            pre_program_id: Option::unpack(&p.pre_program_id, keys)?,
            pre_mint: Option::unpack(&p.pre_mint, keys)?,
            pre_decimals: p.pre_decimals,
            pre_owner: Option::unpack(&p.pre_owner, keys)?,
            pre_amount: p.pre_amount,
            post_program_id: Option::unpack(&p.post_program_id, keys)?,
            post_mint: Option::unpack(&p.post_mint, keys)?,
            post_decimals: p.post_decimals,
            post_owner: Option::unpack(&p.post_owner, keys)?,
            post_amount: p.post_amount,
        };
        TokenBalance::try_from(record)
    }
}

impl Pack for Reward {
    type Packed = PackedReward;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        PackedReward {
            pubkey: self.pubkey.pack(interner),
            lamports: self.lamports,
            post_balance: self.post_balance,
            reward_type: self.reward_type.pack(interner),
            commission: self.commission,
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        Ok(Self {
            pubkey: String::unpack(&p.pubkey, keys)?,
            lamports: p.lamports,
            post_balance: p.post_balance,
            reward_type: Option::unpack(&p.reward_type, keys)?,
            commission: p.commission,
        })
    }
}

impl Pack for Block {
    type Packed = PackedBlock;

    fn pack(&self, interner: &mut Interner) -> Self::Packed {
        PackedBlock {
            header: self.header.pack(interner),
            transactions: self.transactions.pack(interner),
            instructions: self.instructions.pack(interner),
            logs: self.logs.pack(interner),
            balances: self.balances.pack(interner),
            token_balances: self.token_balances.pack(interner),
            rewards: self.rewards.pack(interner),
        }
    }

    fn unpack(p: &Self::Packed, keys: &KeyTable) -> CodecResult<Self> {
        Ok(Self {
            header: BlockHeader::unpack(&p.header, keys)?,
            transactions: Vec::unpack(&p.transactions, keys)?,
            instructions: Vec::unpack(&p.instructions, keys)?,
            logs: Vec::unpack(&p.logs, keys)?,
            balances: Vec::unpack(&p.balances, keys)?,
            token_balances: Vec::unpack(&p.token_balances, keys)?,
            rewards: Vec::unpack(&p.rewards, keys)?,
        })
    }
}

/// Pack a batch of blocks with one fresh dictionary.
#[instrument(skip(blocks), fields(blocks = blocks.len()))]
pub fn pack_blocks(blocks: &[Block]) -> PackedBlockList {
    let mut interner = Interner::new();
    let packed: Vec<PackedBlock> = blocks.iter().map(|b| b.pack(&mut interner)).collect();
    debug!(keys = interner.len(), "blocks packed");
    PackedBlockList {
        encoded_keys: interner.into_encoded_keys(),
        blocks: packed,
    }
}

/// Unpack a batch, failing on any dangling reference or malformed record.
#[instrument(skip(list), fields(blocks = list.blocks.len(), keys = list.encoded_keys.len()))]
pub fn unpack_blocks(list: &PackedBlockList) -> CodecResult<Vec<Block>> {
    let keys = KeyTable::decode(&list.encoded_keys)?;
    Vec::unpack(&list.blocks, &keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::fixtures::{sample_block, ADDRESSES};
    use crate::packed::{EncodedKey, KeyEncoding};
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_roundtrip_sample_blocks() {
        let blocks = vec![sample_block(100, 3), sample_block(101, 5)];
        let packed = pack_blocks(&blocks);
        assert_eq!(unpack_blocks(&packed).unwrap(), blocks);
    }

    #[test]
    fn test_roundtrip_empty_batch() {
        let packed = pack_blocks(&[]);
        assert!(packed.encoded_keys.is_empty());
        assert!(unpack_blocks(&packed).unwrap().is_empty());
    }

    #[test]
    fn test_dictionary_matches_distinct_string_count() {
        let block = sample_block(7, 20);
        let tx = &block.transactions[1];
        let mut expected: HashSet<String> = ADDRESSES.iter().map(|a| a.to_string()).collect();
        expected.extend([
            block.header.hash.clone(),
            block.header.parent_hash.clone(),
            tx.recent_blockhash.clone(),
            String::new(),
            r#"{"InstructionError":[0,{"Custom":1}]}"#.to_string(),
            "3Bxs4h24hBtQy9rw".to_string(),
            "log".to_string(),
            "Instruction: Transfer".to_string(),
            "Rent".to_string(),
        ]);
        expected.extend(block.transactions.iter().flat_map(|t| t.signatures.clone()));
        // 4 addresses, 2 hashes, blockhash, 2 error texts, data, kind, message,
        // reward type, 20 signatures
        assert_eq!(expected.len(), 33);

        let packed = pack_blocks(std::slice::from_ref(&block));
        assert_eq!(packed.encoded_keys.len(), expected.len());

        let keys = KeyTable::decode(&packed.encoded_keys).unwrap();
        let decoded: HashSet<String> = (0..keys.len() as u32)
            .map(|i| keys.resolve(KeyRef::new(i)).unwrap().to_string())
            .collect();
        assert_eq!(decoded, expected);
        assert!(keys.len() < block.string_occurrences());
    }

    #[test]
    fn test_legacy_and_error_normalized() {
        let block = sample_block(1, 2);
        let packed = pack_blocks(std::slice::from_ref(&block));
        let keys = KeyTable::decode(&packed.encoded_keys).unwrap();

        let ok_tx = &packed.blocks[0].transactions[0];
        assert_eq!(ok_tx.version, -1);
        assert_eq!(keys.resolve(ok_tx.err).unwrap(), "");

        let failed_tx = &packed.blocks[0].transactions[1];
        assert_eq!(failed_tx.version, 0);
        assert_eq!(
            keys.resolve(failed_tx.err).unwrap(),
            r#"{"InstructionError":[0,{"Custom":1}]}"#
        );
    }

    #[test]
    fn test_non_json_error_text_survives_as_string() {
        let mut block = sample_block(1, 1);
        block.transactions[0].err = Some(json!("not { json"));
        let mut packed = pack_blocks(std::slice::from_ref(&block));

        // Replace the stored error text with raw, non-JSON text.
        let err_ref = packed.blocks[0].transactions[0].err;
        packed.encoded_keys[err_ref.index()] =
            EncodedKey::new(b"not { json".to_vec(), KeyEncoding::Utf8);

        let back = unpack_blocks(&packed).unwrap();
        assert_eq!(back[0].transactions[0].err, Some(json!("not { json")));
    }

    #[test]
    fn test_out_of_range_reference_is_fatal() {
        let mut packed = pack_blocks(&[sample_block(1, 1)]);
        let len = packed.encoded_keys.len() as u32;
        packed.blocks[0].header.hash = KeyRef::new(len);
        assert!(matches!(
            unpack_blocks(&packed),
            Err(CodecError::KeyOutOfRange { index, len: l }) if index == len && l == len as usize
        ));
    }

    #[test]
    fn test_unknown_key_type_is_fatal() {
        let mut packed = pack_blocks(&[sample_block(1, 1)]);
        packed.encoded_keys[0].kind = 2;
        assert!(matches!(
            unpack_blocks(&packed),
            Err(CodecError::InvalidKeyType(2))
        ));
    }

    #[test]
    fn test_bad_log_kind_is_fatal() {
        let mut packed = pack_blocks(&[sample_block(1, 1)]);
        // point the kind at the block hash
        packed.blocks[0].logs[0].kind = packed.blocks[0].header.hash;
        assert!(matches!(
            unpack_blocks(&packed),
            Err(CodecError::InvalidLogKind(_))
        ));
    }

    #[test]
    fn test_incomplete_token_side_is_fatal() {
        let mut packed = pack_blocks(&[sample_block(1, 1)]);
        packed.blocks[0].token_balances[0].post_amount = None;
        assert!(matches!(
            unpack_blocks(&packed),
            Err(CodecError::InvalidTokenBalance(_))
        ));
    }

    #[test]
    fn test_packing_is_deterministic() {
        let blocks = vec![sample_block(5, 4), sample_block(6, 4)];
        assert_eq!(pack_blocks(&blocks), pack_blocks(&blocks));
    }
}
