//! Priority queue of outstanding receipts (min-heap by creation time)

use pool_model::ReceiptStatus;
use priority_queue::PriorityQueue;
use solana_sdk::pubkey::Pubkey;
use std::cmp::Reverse;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptKind {
    Deposit,
    Withdraw,
}

/// Receipt snapshot decoded from the base ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedReceipt {
    pub address: Pubkey,
    pub kind: ReceiptKind,
    pub pool: Pubkey,
    pub provider: Pubkey,
    pub status: ReceiptStatus,
    pub created_at: i64,
}

impl TrackedReceipt {
    /// Committed on the base ledger, waiting for tokens to move
    pub fn is_settleable(&self) -> bool {
        self.status == ReceiptStatus::Committed
    }

    pub fn is_orphaned(&self, now: i64, after_secs: i64) -> bool {
        pool_model::is_orphaned(self.status, self.created_at, now, after_secs)
    }
}

/// Oldest-first queue keyed by receipt address
pub struct ReceiptQueue {
    queue: PriorityQueue<Pubkey, Reverse<i64>>,
    map: HashMap<Pubkey, TrackedReceipt>,
}

impl ReceiptQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Push or refresh a receipt
    pub fn push(&mut self, receipt: TrackedReceipt) {
        let address = receipt.address;
        let created_at = receipt.created_at;
        self.map.insert(address, receipt);
        self.queue.push(address, Reverse(created_at));
    }

    /// Pop the oldest receipt
    pub fn pop(&mut self) -> Option<TrackedReceipt> {
        let (address, _) = self.queue.pop()?;
        self.map.remove(&address)
    }

    pub fn peek(&self) -> Option<&TrackedReceipt> {
        let (address, _) = self.queue.peek()?;
        self.map.get(address)
    }

    pub fn remove(&mut self, address: &Pubkey) -> Option<TrackedReceipt> {
        self.queue.remove(address);
        self.map.remove(address)
    }

    pub fn get(&self, address: &Pubkey) -> Option<&TrackedReceipt> {
        self.map.get(address)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drain up to `limit` receipts that match `pred`, oldest first
    pub fn take_matching(
        &mut self,
        limit: usize,
        pred: impl Fn(&TrackedReceipt) -> bool,
    ) -> Vec<TrackedReceipt> {
        let mut taken = Vec::new();
        let mut skipped = Vec::new();
        while taken.len() < limit {
            let Some(receipt) = self.pop() else { break };
            if pred(&receipt) {
                taken.push(receipt);
            } else {
                skipped.push(receipt);
            }
        }
        for receipt in skipped {
            self.push(receipt);
        }
        taken
    }

    /// Replace the contents with a fresh scan
    pub fn refresh(&mut self, receipts: impl IntoIterator<Item = TrackedReceipt>) {
        self.queue.clear();
        self.map.clear();
        for receipt in receipts {
            self.push(receipt);
        }
    }
}

impl Default for ReceiptQueue {
    fn default() -> Self {
        Self::new()
    }
}
