//! Sample blocks shared by the unit tests.

use crate::block::*;
use serde_json::json;

pub(crate) const ADDRESSES: [&str; 4] = [
    "11111111111111111111111111111111",
    "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
    "ComputeBudget111111111111111111111111111111",
    "Vote111111111111111111111111111111111111111",
];

const SIGNATURE: &str =
    "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnbJLgp8uirBgmQpjKhoR4tjF3ZpRzrFmBV6UjKdiSZkQUW";

/// A block at `height` with `txs` transactions; transaction 0 is a
/// successful legacy transaction, the others are failed v0 transactions.
pub(crate) fn sample_block(height: u64, txs: u32) -> Block {
    let transactions = (0..txs)
        .map(|i| Transaction {
            transaction_index: i,
            version: if i == 0 {
                TransactionVersion::Legacy
            } else {
                TransactionVersion::Versioned(0)
            },
            account_keys: vec![ADDRESSES[0].to_string(), ADDRESSES[1].to_string()],
            address_table_lookups: vec![AddressTableLookup {
                account_key: ADDRESSES[2].to_string(),
                readonly_indexes: vec![0, 3],
                writable_indexes: vec![1],
            }],
            num_readonly_signed_accounts: 0,
            num_readonly_unsigned_accounts: 1,
            num_required_signatures: 1,
            recent_blockhash: "EtWTRABZaYq6iMfeYKouRu166VU2xqa1wcaWoxPkrZBG".to_string(),
            signatures: vec![format!("{SIGNATURE}{}", bs58::encode([i as u8 + 1]).into_string())],
            err: (i != 0).then(|| json!({"InstructionError": [0, {"Custom": 1}]})),
            compute_units_consumed: 9_007_199_254_740_993,
            fee: 5000 + u64::from(i),
            loaded_addresses: LoadedAddresses {
                readonly: vec![ADDRESSES[3].to_string()],
                writable: vec![],
            },
            has_dropped_log_messages: false,
        })
        .collect();

    Block {
        header: BlockHeader {
            hash: bs58::encode(height.to_le_bytes()).into_string(),
            height,
            slot: height + 10,
            parent_slot: height + 9,
            parent_hash: bs58::encode((height - 1).to_le_bytes()).into_string(),
            timestamp: 1_700_000_000 + height as i64,
        },
        transactions,
        instructions: vec![Instruction {
            transaction_index: 0,
            instruction_address: vec![0],
            program_id: ADDRESSES[1].to_string(),
            accounts: vec![ADDRESSES[0].to_string(), ADDRESSES[3].to_string()],
            data: "3Bxs4h24hBtQy9rw".to_string(),
            compute_units_consumed: Some(u64::MAX),
            error: None,
            is_committed: true,
            has_dropped_log_messages: false,
        }],
        logs: vec![LogMessage {
            transaction_index: 0,
            log_index: 0,
            instruction_address: vec![0],
            program_id: ADDRESSES[1].to_string(),
            kind: LogKind::Log,
            message: "Instruction: Transfer".to_string(),
        }],
        balances: vec![Balance {
            transaction_index: 0,
            account: ADDRESSES[0].to_string(),
            pre: 1_000_000_000_000,
            post: 999_999_995_000,
        }],
        token_balances: vec![TokenBalance {
            transaction_index: 0,
            account: ADDRESSES[3].to_string(),
            pre: None,
            post: Some(TokenAmount {
                program_id: Some(ADDRESSES[1].to_string()),
                mint: ADDRESSES[2].to_string(),
                decimals: 6,
                owner: None,
                amount: 42,
            }),
        }],
        rewards: vec![Reward {
            pubkey: ADDRESSES[3].to_string(),
            lamports: -2_039_280,
            post_balance: 18_446_744_073_709_551_615,
            reward_type: Some("Rent".to_string()),
            commission: None,
        }],
    }
}
